//! Markdown section ledger for daily journaling.
//!
//! The engine works on plain document strings: [`heading`] indexes ATX
//! headings, [`section`] locates and rewrites heading-delimited sections, and
//! [`ledger`] keeps a dated table of entries in one section without ever
//! losing a row. Everything else wires that engine to a note store.

pub mod config;
pub mod diff;
mod error;
pub mod heading;
pub mod journal;
pub mod ledger;
pub mod logging;
pub mod rating;
pub mod section;
pub mod store;
pub mod util;
pub mod vault;
#[cfg(feature = "wasm")]
pub mod wasm;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use heading::{headings, Heading, HeadingLabel};
pub use ledger::{upsert, RowFields, TableRow};
pub use rating::formatted_day_rating;
pub use section::{locate, replace_section_content, section_content, SectionRange};
pub use store::{MemoryStore, NoteRef, NoteStore};
pub use vault::Vault;
pub use workflow::{log_daily_entry, needs_entry, DayResponse, NoteCache};
