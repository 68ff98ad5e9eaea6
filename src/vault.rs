//! A directory of markdown files acting as a [`NoteStore`].
//!
//! One note per `.md` file, named by its file stem. An optional YAML front
//! matter block carries the note's `uuid:` and `tags:`; notes without a uuid
//! are identified by their file stem. Front matter is never rewritten once a
//! note exists, only the body after it.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use markdown::{mdast::Node, Constructs, ParseOptions};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use uuid::Uuid;

use crate::{
    diff::staged_change,
    store::{has_tag, NoteRef, NoteStore},
    util::{iterate_markdown_files, markdown_contains_tag},
    Error, Result,
};

/// The front matter keys a note store cares about. Anything else is kept in
/// the raw block and otherwise ignored.
#[derive(Debug, Clone, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    uuid: Option<Value>,
    #[serde(default)]
    tags: Option<TagList>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Inline(String),
}

#[derive(Serialize)]
struct NewFrontMatter<'a> {
    uuid: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
}

/// A parsed note file.
#[derive(Debug, Clone)]
pub struct NoteFile {
    pub path: PathBuf,
    /// Raw front matter including both `---` fences, if present.
    frontmatter: Option<String>,
    meta: FrontMatter,
    pub body: String,
}

impl NoteFile {
    pub fn at_path(path: PathBuf) -> Result<Self> {
        let raw = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        Ok(Self::parse(path, &raw))
    }

    pub fn parse(path: PathBuf, raw: &str) -> Self {
        let Some((split, yaml)) = split_frontmatter(raw) else {
            return Self {
                path,
                frontmatter: None,
                meta: FrontMatter::default(),
                body: raw.to_string(),
            };
        };

        let meta = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str(&yaml).unwrap_or_else(|err| {
                warn!("ignoring unreadable front matter in {}: {err}", path.display());
                FrontMatter::default()
            })
        };
        Self {
            path,
            frontmatter: Some(raw[..split].to_string()),
            meta,
            body: raw[split..].to_string(),
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn uuid(&self) -> String {
        let uuid = match &self.meta.uuid {
            Some(Value::String(uuid)) => uuid.trim().to_string(),
            Some(Value::Number(uuid)) => uuid.to_string(),
            _ => String::new(),
        };
        if uuid.is_empty() {
            self.name()
        } else {
            uuid
        }
    }

    pub fn tags(&self) -> Vec<String> {
        match &self.meta.tags {
            Some(TagList::List(tags)) => tags
                .iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            Some(TagList::Inline(tags)) => tags
                .split([',', ' '])
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn note_ref(&self) -> NoteRef {
        NoteRef::new(self.name(), self.uuid())
    }

    pub fn with_body(&self, body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..self.clone()
        }
    }

    pub fn render(&self) -> String {
        match &self.frontmatter {
            Some(frontmatter) => format!("{frontmatter}{}", self.body),
            None => self.body.clone(),
        }
    }

    /// Atomically write the note to disk
    pub fn atomic_overwrite(&self) -> Result<()> {
        let mut tmp_path = self.path.clone();
        tmp_path.set_extension("tmp.md");
        fs::write(&tmp_path, self.render()).map_err(|err| Error::io(&tmp_path, err))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| Error::io(&self.path, err))?;
        Ok(())
    }
}

/// Matches notes carrying a tag, in front matter or as a leading inline tag.
struct TagMatcher<'a> {
    tag: &'a str,
    inline: Regex,
}

impl<'a> TagMatcher<'a> {
    fn new(tag: &'a str) -> Result<Self> {
        Ok(Self {
            tag,
            inline: markdown_contains_tag(tag)?,
        })
    }

    fn matches(&self, note: &NoteFile) -> bool {
        has_tag(&note.tags(), self.tag) || self.inline.is_match(&note.render())
    }
}

fn frontmatter_options() -> ParseOptions {
    ParseOptions {
        constructs: Constructs {
            frontmatter: true,
            ..Constructs::gfm()
        },
        ..ParseOptions::gfm()
    }
}

/// Byte offset where the body starts after a `---` fenced YAML block, and
/// the YAML between the fences.
fn split_frontmatter(raw: &str) -> Option<(usize, String)> {
    if !raw.starts_with("---") {
        return None;
    }
    let root = markdown::to_mdast(raw, &frontmatter_options()).ok()?;
    let Some(Node::Yaml(yaml)) = root.children()?.first() else {
        return None;
    };

    let end = yaml.position.as_ref()?.end.offset.min(raw.len());
    let fence_end = raw[..end].trim_end_matches(['\n', '\r']).len();
    let rest = &raw[fence_end..];
    let split = if rest.starts_with("\r\n") {
        fence_end + 2
    } else if rest.starts_with('\n') {
        fence_end + 1
    } else {
        fence_end
    };
    Some((split, yaml.value.clone()))
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// The file stem a note name is stored under.
fn note_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn file_name_for(name: &str) -> String {
    format!("{}.md", note_stem(name))
}

/// Filesystem note store rooted at a vault directory.
///
/// In dry-run mode nothing is written; every write is printed as a diff and
/// kept in memory so later reads in the same run see it.
pub struct Vault {
    root: PathBuf,
    dry_run: bool,
    staged: BTreeMap<PathBuf, String>,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "vault directory not found"),
            ));
        }
        Ok(Self {
            root,
            dry_run: false,
            staged: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All notes in the vault, sorted by path.
    pub fn notes(&self) -> Vec<NoteFile> {
        let mut notes: Vec<NoteFile> = iterate_markdown_files(&self.root)
            .filter(|entry| !self.staged.contains_key(entry.path()))
            .filter_map(|entry| match NoteFile::at_path(entry.into_path()) {
                Ok(note) => Some(note),
                Err(err) => {
                    warn!("skipping unreadable note: {err}");
                    None
                }
            })
            .collect();
        notes.extend(
            self.staged
                .iter()
                .map(|(path, raw)| NoteFile::parse(path.clone(), raw)),
        );
        notes.sort_by(|a, b| a.path.cmp(&b.path));
        notes
    }

    fn note_file(&self, note: &NoteRef) -> Result<NoteFile> {
        self.notes()
            .into_iter()
            .find(|file| file.uuid() == note.uuid)
            .ok_or_else(|| Error::NoteNotFound(note.name.clone()))
    }

    /// Path of the file backing `note`.
    pub fn path_of(&self, note: &NoteRef) -> Result<PathBuf> {
        self.note_file(note).map(|file| file.path)
    }

    /// Find a note by name alone, ignoring tags.
    pub fn note_named(&self, name: &str) -> Result<NoteRef> {
        self.find_note(name, &[])?
            .ok_or_else(|| Error::NoteNotFound(name.to_string()))
    }

    fn write(&mut self, file: &NoteFile) -> Result<()> {
        if self.dry_run {
            let old = match self.staged.get(&file.path) {
                Some(raw) => raw.clone(),
                None => fs::read_to_string(&file.path).unwrap_or_default(),
            };
            if let Some(change) = staged_change(&file.path, &old, &file.render()) {
                print!("{change}");
            }
            self.staged.insert(file.path.clone(), file.render());
            return Ok(());
        }
        file.atomic_overwrite()
    }
}

impl NoteStore for Vault {
    fn find_note(&self, name: &str, tags: &[String]) -> Result<Option<NoteRef>> {
        let stem = note_stem(name);
        let matchers = tags
            .iter()
            .map(|tag| TagMatcher::new(tag))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .notes()
            .into_iter()
            .find(|file| file.name() == stem && matchers.iter().all(|tag| tag.matches(file)))
            .map(|file| file.note_ref()))
    }

    /// Creates the note file, or hands back the note already stored under
    /// that file name.
    fn create_note(&mut self, name: &str, tags: &[String]) -> Result<NoteRef> {
        let path = self.root.join(file_name_for(name));
        if let Some(raw) = self.staged.get(&path) {
            return Ok(NoteFile::parse(path.clone(), raw).note_ref());
        }
        if path.exists() {
            warn!("note file {} already exists, reusing it", path.display());
            return Ok(NoteFile::at_path(path)?.note_ref());
        }

        let uuid = new_uuid();
        let yaml = serde_yaml::to_string(&NewFrontMatter { uuid: &uuid, tags })?;
        let file = NoteFile::parse(path, &format!("---\n{yaml}---\n"));
        self.write(&file)?;
        info!("created note {} at {}", name, file.path.display());
        Ok(file.note_ref())
    }

    fn content(&self, note: &NoteRef) -> Result<String> {
        self.note_file(note).map(|file| file.body)
    }

    fn set_content(&mut self, note: &NoteRef, content: &str) -> Result<()> {
        let file = self.note_file(note)?;
        if file.body == content {
            debug!("note {} unchanged", note.name);
            return Ok(());
        }
        self.write(&file.with_body(content))
    }

    fn notes_tagged(&self, tag: &str) -> Result<Vec<NoteRef>> {
        let matcher = TagMatcher::new(tag)?;
        Ok(self
            .notes()
            .into_iter()
            .filter(|file| matcher.matches(file))
            .map(|file| file.note_ref())
            .collect())
    }
}
