//! Journal note content: the five-question template and day rating entries.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::store::NoteRef;

/// Heading added to a journal note the first time a rating is recorded.
pub const DAY_RATING_HEADING: &str = "# Day Rating";

pub const FIVE_QUESTION_MARKDOWN: &str = "\
# [What am I grateful for?](gratitude_link)
1.
2.
3.

# [What were the highlights of today?](highlights_link)
-

# [What did I learn today?](learning_link)
-

# What would have made today better?
-

# What am I looking forward to tomorrow?
-
";

lazy_static! {
    static ref PLACEHOLDER_LINK: Regex = Regex::new(r"\[([^\]]+)\]\((\w+)_link\)").unwrap();
}

/// The themed notes whose backlinks collect journal answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Backlink {
    Gratitude,
    Highlights,
    Learning,
}

impl Backlink {
    pub const ALL: [Backlink; 3] = [Self::Gratitude, Self::Highlights, Self::Learning];

    pub fn label(self) -> &'static str {
        match self {
            Self::Gratitude => "gratitude",
            Self::Highlights => "highlights",
            Self::Learning => "learning",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|backlink| backlink.label() == label)
    }
}

/// The journal template with each backlink placeholder pointing at its note.
/// Questions without a backlink note keep their text but lose the link.
pub fn journal_content_with_links(backlinks: &BTreeMap<Backlink, NoteRef>) -> String {
    PLACEHOLDER_LINK
        .replace_all(FIVE_QUESTION_MARKDOWN, |caps: &Captures| {
            match Backlink::from_label(&caps[2]).and_then(|backlink| backlinks.get(&backlink)) {
                Some(note) => format!("[{}]({})", &caps[1], note.url()),
                None => caps[1].to_string(),
            }
        })
        .into_owned()
}

/// Text to append to a journal note recording a day rating.
///
/// Starts the `# Day Rating` section when `journal` does not have one yet.
pub fn day_rating_entry(
    journal: &str,
    at: NaiveTime,
    formatted_rating: &str,
    events: Option<&str>,
) -> String {
    let mut entry = format!(
        "- Rating as of {}: {formatted_rating}",
        at.format("%I:%M %p")
    );
    if let Some(events) = events.filter(|events| !events.is_empty()) {
        entry.push_str(&format!("\n    - Precipitating factors: {events}"));
    }
    entry.push('\n');

    if !journal.contains(DAY_RATING_HEADING) {
        entry = format!("\n{DAY_RATING_HEADING}\n{entry}");
    }
    if !journal.is_empty() && !journal.ends_with('\n') {
        entry.insert(0, '\n');
    }
    entry
}
