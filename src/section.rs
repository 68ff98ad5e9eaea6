//! Section location and editing.
//!
//! A section is the text owned by a heading: from just after the heading line
//! to just before the next heading of equal or lesser depth (or the end of the
//! document). Deeper headings in between belong to the section.

use log::debug;

use crate::{
    heading::{headings, normalize_label},
    Error, Result,
};

/// Half-open byte range `[start, end)` of a section's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
}

impl SectionRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locate the content range of the first section labelled `label`.
///
/// Returns `None` when no heading carries that label; that is an expected
/// outcome, not a failure.
pub fn locate(document: &str, label: &str) -> Option<SectionRange> {
    let label = normalize_label(label);
    let mut found = headings(document).skip_while(|heading| heading.text != label);

    let Some(heading) = found.next() else {
        debug!("section {label:?} not present in document");
        return None;
    };

    let start = (heading.line_end + 1).min(document.len());
    let end = found
        .find(|next| next.depth <= heading.depth)
        .map_or(document.len(), |next| next.offset);

    Some(SectionRange { start, end })
}

/// Content of the section labelled `label`, if present.
pub fn section_content<'a>(document: &'a str, label: &str) -> Option<&'a str> {
    locate(document, label).map(|range| &document[range.start..range.end])
}

/// Replace the content of the section labelled `label`, leaving every byte
/// outside the section untouched.
pub fn replace_section_content(document: &str, label: &str, content: &str) -> Result<String> {
    let range = locate(document, label)
        .ok_or_else(|| Error::SectionNotFound(normalize_label(label).to_string()))?;
    Ok(splice(document, range, content))
}

/// Append a new `# label` section holding `content` at the end of the document.
pub fn append_section(document: &str, label: &str, content: &str) -> String {
    let mut new_document = String::with_capacity(document.len() + label.len() + content.len() + 4);
    new_document.push_str(document);
    if !document.is_empty() && !document.ends_with('\n') {
        new_document.push('\n');
    }
    new_document.push_str("# ");
    new_document.push_str(normalize_label(label));
    new_document.push('\n');
    new_document.push_str(content);
    new_document
}

/// Replace the section's content when it exists, otherwise append it.
pub fn upsert_section_content(document: &str, label: &str, content: &str) -> String {
    match locate(document, label) {
        Some(range) => splice(document, range, content),
        None => append_section(document, label, content),
    }
}

fn splice(document: &str, range: SectionRange, content: &str) -> String {
    let mut new_document =
        String::with_capacity(document.len() - range.len() + content.len() + 1);
    new_document.push_str(&document[..range.start]);
    // a heading on the last line has no newline of its own yet
    if !content.is_empty() && !new_document.ends_with('\n') {
        new_document.push('\n');
    }
    new_document.push_str(content);
    new_document.push_str(&document[range.end..]);
    new_document
}
