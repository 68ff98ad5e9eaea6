//! The bullet journal ledger: a markdown table of dated entries kept under one
//! section of a note, newest row first.
//!
//! Every upsert rewrites the section as the fixed two-line table header, the
//! new row, and then the previously stored rows verbatim, so rows are never
//! dropped or duplicated no matter how many times an entry is recorded.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::{
    heading::headings,
    rating::formatted_day_rating,
    section::{section_content, upsert_section_content},
    store::NoteRef,
};

pub const TABLE_HEADER: &str =
    "| **Bullet Journal Note** | **Day Rating** | **Precipitating events** | **Captured at** |";
pub const TABLE_SEPARATOR: &str = "| --- | --- | --- | --- |";

const SEE_NOTE: &str = "See note";

lazy_static! {
    static ref SEPARATOR_ROW: Regex = Regex::new(r"^\|(?:\s*:?-{3,}:?\s*\|)+\s*$").unwrap();
}

/// Raw values for one ledger row, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    /// The journal note the row links to.
    pub note: NoteRef,
    /// The day rating, if one was given.
    pub rating: Option<i64>,
    /// What made the day what it was. Only recorded alongside a rating.
    pub events: Option<String>,
    /// Already formatted capture time, see [`format_captured_at`].
    pub captured_at: String,
}

/// One formatted ledger row: note link, rating, events and capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: [String; 4],
}

impl TableRow {
    pub fn format(fields: &RowFields) -> Self {
        let (rating, events) = match fields.rating {
            Some(rating) => (
                formatted_day_rating(rating),
                escape_newlines(fields.events.as_deref().unwrap_or_default()),
            ),
            None => (SEE_NOTE.to_string(), SEE_NOTE.to_string()),
        };

        Self {
            cells: [
                fields.note.markdown_link(),
                rating,
                events,
                fields.captured_at.clone(),
            ],
        }
    }

    /// The row as a single pipe-delimited markdown table line.
    pub fn render(&self) -> String {
        format!("| {} |", self.cells.join(" | "))
    }
}

fn escape_newlines(text: &str) -> String {
    text.replace("\r\n", "\\").replace(['\n', '\r'], "\\")
}

/// Capture time in the `M/D/YYYY, h:mm:ss AM` shape.
pub fn format_captured_at(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Calendar date in the `M/D/YYYY` shape used inside [`format_captured_at`].
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn is_separator(line: &str) -> bool {
    SEPARATOR_ROW.is_match(line.trim_end())
}

/// The stored rows of a table section, with the header removed.
///
/// The first column-title row directly followed by a `| --- |` separator is
/// the header; it and everything above it are dropped. Without such a pair,
/// only leading blank lines and stray heading lines are dropped. Everything
/// after is returned verbatim.
pub fn existing_tail(section: &str) -> &str {
    let mut offset = 0;
    let mut lines = section.split_inclusive('\n').peekable();
    while let Some(line) = lines.next() {
        offset += line.len();
        if let Some(separator) = lines.peek() {
            if line.starts_with('|') && is_separator(separator) {
                return &section[offset + separator.len()..];
            }
        }
    }

    let leading: usize = section
        .split_inclusive('\n')
        .take_while(|line| line.trim().is_empty() || headings(line).next().is_some())
        .map(str::len)
        .sum();
    &section[leading..]
}

/// Record `row` as the newest entry of the table under `label`, creating the
/// section and table header when they do not exist yet.
pub fn upsert(document: &str, label: &str, row: &TableRow) -> String {
    let tail = match section_content(document, label) {
        Some(section) if !section.is_empty() => existing_tail(section),
        _ => {
            info!("no existing data table in section {label:?}, creating one");
            ""
        }
    };
    debug!(
        "preserving {} existing ledger rows",
        tail.lines().filter(|line| line.starts_with('|')).count()
    );

    let content = format!(
        "{TABLE_HEADER}\n{TABLE_SEPARATOR}\n{}\n{tail}",
        row.render()
    );
    upsert_section_content(document, label, &content)
}

/// The data rows stored under `label`, newest first, or `None` when the
/// section is absent or empty.
pub fn ledger_rows<'a>(document: &'a str, label: &str) -> Option<Vec<&'a str>> {
    let section = section_content(document, label).filter(|section| !section.is_empty())?;
    Some(
        existing_tail(section)
            .lines()
            .filter(|line| line.starts_with('|') && *line != TABLE_HEADER && !is_separator(line))
            .collect(),
    )
}

/// Whether some row under `label` was captured on `date_text` (see [`format_date`]).
pub fn has_entry_for(document: &str, label: &str, date_text: &str) -> bool {
    let captured_on = format!("| {date_text}, ");
    ledger_rows(document, label)
        .is_some_and(|rows| rows.iter().any(|row| row.contains(&captured_on)))
}
