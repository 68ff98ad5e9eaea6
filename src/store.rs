//! Note store seam. The ledger engine only ever sees strings; a `NoteStore`
//! is where those strings come from and go back to.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Handle to a stored note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteRef {
    pub name: String,
    pub uuid: String,
}

impl NoteRef {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
        }
    }

    /// Note-relative URL, `/notes/<uuid>`.
    pub fn url(&self) -> String {
        format!("/notes/{}", self.uuid)
    }

    /// `[name](/notes/<uuid>)`
    pub fn markdown_link(&self) -> String {
        format!("[{}]({})", self.name, self.url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Start,
    End,
}

pub trait NoteStore {
    /// Find a note by exact name carrying every one of `tags`.
    fn find_note(&self, name: &str, tags: &[String]) -> Result<Option<NoteRef>>;

    fn create_note(&mut self, name: &str, tags: &[String]) -> Result<NoteRef>;

    fn content(&self, note: &NoteRef) -> Result<String>;

    fn set_content(&mut self, note: &NoteRef, content: &str) -> Result<()>;

    /// Notes tagged with `tag` or one of its sub-tags (`tag/...`).
    fn notes_tagged(&self, tag: &str) -> Result<Vec<NoteRef>>;

    fn insert_content(&mut self, note: &NoteRef, text: &str, at: InsertAt) -> Result<()> {
        let content = self.content(note)?;
        let new_content = match at {
            InsertAt::Start => format!("{text}{content}"),
            InsertAt::End => format!("{content}{text}"),
        };
        self.set_content(note, &new_content)
    }
}

/// Whether `tags` contains `tag` itself or a sub-tag of it.
pub fn has_tag(tags: &[String], tag: &str) -> bool {
    let tag = tag.trim_start_matches('#');
    tags.iter().any(|candidate| {
        let candidate = candidate.trim_start_matches('#');
        candidate == tag
            || candidate
                .strip_prefix(tag)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[derive(Debug, Clone)]
struct MemoryNote {
    name: String,
    tags: Vec<String>,
    content: String,
}

/// In-memory `NoteStore`, keyed by uuid.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    notes: BTreeMap<String, MemoryNote>,
    next_id: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self, note: &NoteRef) -> Option<&[String]> {
        self.notes.get(&note.uuid).map(|n| n.tags.as_slice())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteStore for MemoryStore {
    fn find_note(&self, name: &str, tags: &[String]) -> Result<Option<NoteRef>> {
        Ok(self
            .notes
            .iter()
            .find(|(_, note)| note.name == name && tags.iter().all(|t| has_tag(&note.tags, t)))
            .map(|(uuid, note)| NoteRef::new(note.name.clone(), uuid.clone())))
    }

    fn create_note(&mut self, name: &str, tags: &[String]) -> Result<NoteRef> {
        self.next_id += 1;
        let uuid = format!("local-{}", self.next_id);
        self.notes.insert(
            uuid.clone(),
            MemoryNote {
                name: name.to_string(),
                tags: tags.to_vec(),
                content: String::new(),
            },
        );
        Ok(NoteRef::new(name, uuid))
    }

    fn content(&self, note: &NoteRef) -> Result<String> {
        self.notes
            .get(&note.uuid)
            .map(|n| n.content.clone())
            .ok_or_else(|| Error::NoteNotFound(note.name.clone()))
    }

    fn set_content(&mut self, note: &NoteRef, content: &str) -> Result<()> {
        let stored = self
            .notes
            .get_mut(&note.uuid)
            .ok_or_else(|| Error::NoteNotFound(note.name.clone()))?;
        stored.content = content.to_string();
        Ok(())
    }

    fn notes_tagged(&self, tag: &str) -> Result<Vec<NoteRef>> {
        Ok(self
            .notes
            .iter()
            .filter(|(_, note)| has_tag(&note.tags, tag))
            .map(|(uuid, note)| NoteRef::new(note.name.clone(), uuid.clone()))
            .collect())
    }
}
