//! ATX heading index.
//!
//! Headings are recognised line by line: a line that begins with a run of `#`
//! characters, followed by at least one space or tab, followed by text. The
//! width of the `#` run is the heading depth, and the label is the text up to
//! the next `#` (so closing sequences like `## Foo ##` are ignored), trimmed.
//! A `#tag` at the start of a line is a tag, not a heading.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One heading occurrence in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Trimmed heading label.
    pub text: &'a str,
    /// Number of leading `#` characters.
    pub depth: usize,
    /// Byte offset of the first `#`.
    pub offset: usize,
    /// Byte offset of the newline ending the heading line, or the document
    /// length when the heading is on the last line.
    pub line_end: usize,
}

/// Lazy iterator over the headings of a document. Cheap to recreate; holds no
/// state beyond its cursor.
pub struct Headings<'a> {
    document: &'a str,
    cursor: usize,
}

pub fn headings(document: &str) -> Headings<'_> {
    Headings {
        document,
        cursor: 0,
    }
}

impl<'a> Iterator for Headings<'a> {
    type Item = Heading<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.document.len() {
            let offset = self.cursor;
            let line_end = self.document[offset..]
                .find('\n')
                .map_or(self.document.len(), |i| offset + i);
            self.cursor = line_end + 1;

            if let Some((depth, text)) = parse_heading_line(&self.document[offset..line_end]) {
                return Some(Heading {
                    text,
                    depth,
                    offset,
                    line_end,
                });
            }
        }
        None
    }
}

fn parse_heading_line(line: &str) -> Option<(usize, &str)> {
    let depth = line.bytes().take_while(|&b| b == b'#').count();
    if depth == 0 {
        return None;
    }

    let after_marker = &line[depth..];
    let text = after_marker.trim_start_matches([' ', '\t']);
    if text.len() == after_marker.len() {
        return None;
    }

    let run = &text[..text.find(['#', '\r']).unwrap_or(text.len())];
    if run.is_empty() {
        return None;
    }
    Some((depth, run.trim()))
}

/// Strip any leading `#` markers and surrounding whitespace, so `"## Foo"`
/// and `"Foo"` name the same section. Like a heading's own label, the text
/// stops at the next `#`.
pub fn normalize_label(label: &str) -> &str {
    let label = label.trim().trim_start_matches('#');
    label[..label.find(['#', '\r']).unwrap_or(label.len())].trim()
}

/// First heading whose label matches `label`, in document order.
pub fn find_heading<'a>(document: &'a str, label: &str) -> Option<Heading<'a>> {
    let label = normalize_label(label);
    headings(document).find(|heading| heading.text == label)
}

/// A section label as supplied by a caller: either plain heading text, or a
/// section descriptor of the shape `{ heading = { text = "..." } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawHeadingLabel")]
pub enum HeadingLabel {
    Text(String),
    Descriptor(SectionDescriptor),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub heading: HeadingText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingText {
    pub text: String,
}

impl HeadingLabel {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Descriptor(descriptor) => &descriptor.heading.text,
        }
    }

    /// The label with heading markers and whitespace removed.
    pub fn normalized(&self) -> &str {
        normalize_label(self.text())
    }

    /// Reject labels that no heading could carry: empty ones, and ones with
    /// a `#` after the leading markers, which would end a heading's label.
    pub fn checked(self) -> Result<Self, Error> {
        let text = self.text().trim().trim_start_matches('#');
        if text.contains('#') {
            return Err(Error::InvalidLabel(format!(
                "`{}` has a `#` after its heading markers",
                self.text()
            )));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidLabel("section label is empty".to_string()));
        }
        Ok(self)
    }
}

impl From<&str> for HeadingLabel {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for HeadingLabel {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Display for HeadingLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHeadingLabel {
    Text(String),
    Descriptor { heading: Option<RawHeadingText> },
}

#[derive(Deserialize)]
struct RawHeadingText {
    text: Option<String>,
}

impl TryFrom<RawHeadingLabel> for HeadingLabel {
    type Error = Error;

    fn try_from(raw: RawHeadingLabel) -> Result<Self, Self::Error> {
        match raw {
            RawHeadingLabel::Text(text) => Self::Text(text).checked(),
            RawHeadingLabel::Descriptor {
                heading: Some(RawHeadingText { text: Some(text) }),
            } => Self::Descriptor(SectionDescriptor {
                heading: HeadingText { text },
            })
            .checked(),
            RawHeadingLabel::Descriptor { heading: None } => Err(Error::InvalidLabel(
                "section descriptor has no `heading` table".to_string(),
            )),
            RawHeadingLabel::Descriptor { .. } => Err(Error::InvalidLabel(
                "section descriptor heading has no `text` field".to_string(),
            )),
        }
    }
}
