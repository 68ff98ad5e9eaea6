use std::path::Path;

use lazy_static::lazy_static;
use log::warn;
use rayon::prelude::*;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

lazy_static! {
    static ref IS_SYNC_CONFLICT: Regex = Regex::new(r"\.sync-conflict-\d+-\d+-").unwrap();
}

/// Returns a regex that matches markdown files if they contain the given tag
/// (or one of its sub-tags) in the leading tag lines
///
/// # Arguments
///
/// * `tag` - The tag to match
pub fn markdown_contains_tag(tag: &str) -> Result<Regex, regex::Error> {
    Regex::new(
        format!(
            r"(?sx)^
        (?:                 # match the optional frontmatter section
            \n*                 # leading newlines
            \-{{3}}             # frontmatter starts with `---`
            .*\n                # frontmatter content
            \-{{3}}\n           # frontmatter ends with `---\n`
        )?
        \n*                 # match leading newlines
        (?:\#[\w\-/]+\s)*   # match other tags
        \#{tag}             # match the arbitrary tag
        (?:/|\s|$)          # either a sub-tag or the end of the tag"
        ,
            tag = regex::escape(tag.trim_start_matches('#'))
        )
        .as_str(),
    )
}

pub fn is_visible(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |s| !s.starts_with('.'))
}

pub fn is_sync_conflict(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |s| IS_SYNC_CONFLICT.is_match(s))
}

/// Every visible, non-conflicted markdown file below `vault_path`.
pub fn iterate_markdown_files(vault_path: &Path) -> impl ParallelIterator<Item = DirEntry> {
    WalkDir::new(vault_path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || (is_visible(e) && !is_sync_conflict(e)))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable vault entry: {err}");
                None
            }
        })
        .par_bridge()
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().unwrap_or_default() == "md")
}
