//! Vault-level settings.
//!
//! Read from `.jotledger.toml` in the vault root when present. Every key is
//! optional; anything unset falls back to a default.

use std::{fs, path::Path, path::PathBuf};

use chrono::{
    format::{Item, StrftimeItems},
    NaiveDate,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{heading::HeadingLabel, Error, Result};

pub const CONFIG_FILE_NAME: &str = ".jotledger.toml";
pub const DEFAULT_TABLE_SECTION: &str = "\"Bullet Journal\" Entries";
pub const DEFAULT_DATA_NOTE: &str = "Bullet Journal Data";
pub const DEFAULT_GRATITUDE_NOTE: &str = "Gratitude Themes";
pub const DEFAULT_HIGHLIGHTS_NOTE: &str = "Highlight Themes";
pub const DEFAULT_LEARNING_NOTE: &str = "Learning Themes";
pub const DEFAULT_JOURNAL_TAGS: &[&str] = &["daily-jots"];
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// A backlink note name of `none` disables that backlink note.
pub const DISABLED_NOTE_NAME: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Note holding the ledger table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_note: Option<String>,
    /// chrono strftime pattern for the journal note's date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Comma-separated tags applied to journal notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gratitude_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_note: Option<String>,
    /// Heading of the section the ledger table lives in.
    pub table_section: HeadingLabel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_note: None,
            date_format: None,
            journal_tags: None,
            data_tags: None,
            gratitude_note: None,
            highlights_note: None,
            learning_note: None,
            table_section: HeadingLabel::from(DEFAULT_TABLE_SECTION),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    pub fn path(vault_root: &Path) -> PathBuf {
        vault_root.join(CONFIG_FILE_NAME)
    }

    /// Load the vault's config, or the defaults when it has none.
    ///
    /// # Errors
    ///
    /// A config file that exists but cannot be read or parsed is an error;
    /// it is never silently replaced by defaults.
    pub fn load(vault_root: &Path) -> Result<Self> {
        let path = Self::path(vault_root);
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        toml::from_str(&contents).map_err(|source| Error::Config { path, source })
    }

    pub fn save(&self, vault_root: &Path) -> Result<()> {
        let path = Self::path(vault_root);
        let contents = toml::to_string(self)?;
        fs::write(&path, contents).map_err(|err| Error::io(&path, err))
    }

    pub fn data_note_name(&self) -> &str {
        non_empty(&self.data_note).unwrap_or(DEFAULT_DATA_NOTE)
    }

    pub fn table_section(&self) -> &str {
        self.table_section.normalized()
    }

    pub fn gratitude_note_name(&self) -> &str {
        non_empty(&self.gratitude_note).unwrap_or(DEFAULT_GRATITUDE_NOTE)
    }

    pub fn highlights_note_name(&self) -> &str {
        non_empty(&self.highlights_note).unwrap_or(DEFAULT_HIGHLIGHTS_NOTE)
    }

    pub fn learning_note_name(&self) -> &str {
        non_empty(&self.learning_note).unwrap_or(DEFAULT_LEARNING_NOTE)
    }

    /// Explicitly configured journal tags, if any.
    pub fn journal_tags(&self) -> Option<Vec<String>> {
        let tags: Vec<String> = non_empty(&self.journal_tags)?
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        (!tags.is_empty()).then_some(tags)
    }

    /// The journal note's date, formatted with `date_format`. An invalid
    /// pattern falls back to the default rather than failing the entry.
    pub fn format_journal_date(&self, date: NaiveDate) -> String {
        let pattern = match non_empty(&self.date_format) {
            Some(pattern) if StrftimeItems::new(pattern).any(|item| item == Item::Error) => {
                warn!("invalid date_format {pattern:?}, using {DEFAULT_DATE_FORMAT:?}");
                DEFAULT_DATE_FORMAT
            }
            Some(pattern) => pattern,
            None => DEFAULT_DATE_FORMAT,
        };
        date.format(pattern).to_string()
    }
}
