use std::{fmt, path::Path};

use console::Style;
use similar::{ChangeTag, TextDiff};

struct Line(Option<usize>);

// lifted from https://github.com/mitsuhiko/similar/blob/de455873dab514082bf6e7bb5f0029837fe280d5/examples/terminal-inline.rs

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            None => write!(f, "    "),
            Some(idx) => write!(f, "{:<4}", idx + 1),
        }
    }
}

/// Render a colored, inline-highlighted diff of `old` against `new`, with
/// three lines of context around each change.
#[must_use]
pub fn diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            out.push_str(&format!("{:-^1$}\n", "-", 80));
        }
        for op in group {
            for change in diff.iter_inline_changes(op) {
                let (sign, s) = match change.tag() {
                    ChangeTag::Delete => ("-", Style::new().red()),
                    ChangeTag::Insert => ("+", Style::new().green()),
                    ChangeTag::Equal => (" ", Style::new().dim()),
                };
                out.push_str(&format!(
                    "{}{} |{}",
                    s.apply_to(Line(change.old_index())).dim(),
                    s.apply_to(Line(change.new_index())).dim(),
                    s.apply_to(sign).bold(),
                ));
                for (emphasized, value) in change.iter_strings_lossy() {
                    if emphasized {
                        out.push_str(&format!("{}", s.apply_to(value).underlined().on_black()));
                    } else {
                        out.push_str(&format!("{}", s.apply_to(value)));
                    }
                }
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// A pending write to `path` as a titled diff block, or `None` when the
/// write would not change anything.
pub fn staged_change(path: &Path, old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }
    let title = if old.is_empty() { "new note" } else { "modified" };
    Some(format!(
        "{} {}\n{}",
        Style::new().bold().apply_to(title),
        path.display(),
        diff(old, new)
    ))
}
