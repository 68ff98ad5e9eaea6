//! The daily entry: make sure the day's journal note and its backlink notes
//! exist, then record the day's rating in the ledger.
//!
//! Note lookups are memoized in an explicit [`NoteCache`] owned by the caller,
//! so the same handles are reused across the steps of one run without any
//! state living in the ledger engine itself.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::{
    config::{Config, DISABLED_NOTE_NAME},
    journal::{day_rating_entry, journal_content_with_links, Backlink},
    ledger::{self, format_captured_at, format_date, RowFields, TableRow},
    rating::formatted_day_rating,
    store::{InsertAt, NoteRef, NoteStore},
    Result,
};

pub const TAG_SUFFIX: &str = "bullet-journal";
pub const DATA_TAG_SUFFIX: &str = "five-questions";
pub const ROOT_TAG_CANDIDATES: [&str; 4] = ["personal", "me", "business", "biz"];

const BACKLINK_NOTE_INTRO: &str = "Periodically browse the \"Backlinks\" tab, and summarize any repeating patterns that you see:\n\n\\\n\n";

/// Journal notes with more content than this are considered already set up.
const POPULATED_JOURNAL_LEN: usize = 100;

/// Note handles resolved during a run.
#[derive(Debug, Default, Clone)]
pub struct NoteCache {
    pub backlinks: BTreeMap<Backlink, NoteRef>,
    pub journal: Option<NoteRef>,
    pub data: Option<NoteRef>,
    root_tag: Option<Option<String>>,
}

/// What the user said about their day. A missing rating means they skipped
/// the question, and the row points them at the journal note instead.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DayResponse {
    pub rating: Option<i64>,
    pub events: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub journal: NoteRef,
    pub data: NoteRef,
    pub row: TableRow,
}

/// Run the whole daily entry for the moment `now`.
pub fn log_daily_entry<S: NoteStore>(
    store: &mut S,
    config: &Config,
    cache: &mut NoteCache,
    now: NaiveDateTime,
    response: &DayResponse,
) -> Result<EntryOutcome> {
    ensure_backlink_notes(store, config, cache)?;
    let journal = ensure_journal_note(store, config, cache, now.date())?;
    info!("journal note for today is {:?} ({})", journal.name, journal.url());
    let (data, row) = persist_table_data(store, config, cache, &journal, now, response)?;
    Ok(EntryOutcome { journal, data, row })
}

/// The first candidate root tag that some note already uses.
pub fn root_data_tag<S: NoteStore>(store: &S, cache: &mut NoteCache) -> Result<Option<String>> {
    if let Some(root) = &cache.root_tag {
        return Ok(root.clone());
    }
    let mut root = None;
    for candidate in ROOT_TAG_CANDIDATES {
        if store.notes_tagged(candidate)?.is_empty() {
            debug!("no notes exist for tag {candidate}");
        } else {
            root = Some(candidate.to_string());
            break;
        }
    }
    if root.is_none() {
        debug!("no base tag found for data note");
    }
    cache.root_tag = Some(root.clone());
    Ok(root)
}

fn backlink_note_name(config: &Config, backlink: Backlink) -> &str {
    match backlink {
        Backlink::Gratitude => config.gratitude_note_name(),
        Backlink::Highlights => config.highlights_note_name(),
        Backlink::Learning => config.learning_note_name(),
    }
}

/// Find or create the gratitude, highlights and learning notes.
pub fn ensure_backlink_notes<S: NoteStore>(
    store: &mut S,
    config: &Config,
    cache: &mut NoteCache,
) -> Result<()> {
    for backlink in Backlink::ALL {
        let name = backlink_note_name(config, backlink);
        if name == DISABLED_NOTE_NAME {
            continue;
        }
        if let Some(note) = store.find_note(name, &[])? {
            debug!("using note {name:?} for {} backlinks", backlink.label());
            cache.backlinks.insert(backlink, note);
            continue;
        }

        info!("no note exists for {} backlinks, creating {name:?}", backlink.label());
        let tags: Vec<String> = root_data_tag(store, cache)?
            .map(|root| format!("{root}/{TAG_SUFFIX}"))
            .into_iter()
            .collect();
        let note = store.create_note(name, &tags)?;
        store.insert_content(&note, BACKLINK_NOTE_INTRO, InsertAt::Start)?;
        cache.backlinks.insert(backlink, note);
    }
    Ok(())
}

pub fn journal_note_name(config: &Config, date: NaiveDate) -> String {
    format!("{} Bullet Journal", config.format_journal_date(date))
}

/// Tags for journal notes: the configured list, or the defaults plus
/// `<root>/bullet-journal`.
pub fn journal_tags<S: NoteStore>(
    store: &S,
    config: &Config,
    cache: &mut NoteCache,
) -> Result<Vec<String>> {
    if let Some(tags) = config.journal_tags() {
        return Ok(tags);
    }
    let mut tags: Vec<String> = crate::config::DEFAULT_JOURNAL_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .collect();
    if let Some(root) = root_data_tag(store, cache)? {
        let tag = format!("{root}/{TAG_SUFFIX}");
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// Find or create the journal note for `date`, filling it with the question
/// template unless it already has content of its own. A store may hand back
/// an existing note from `create_note`, so created notes are checked too.
pub fn ensure_journal_note<S: NoteStore>(
    store: &mut S,
    config: &Config,
    cache: &mut NoteCache,
    date: NaiveDate,
) -> Result<NoteRef> {
    let name = journal_note_name(config, date);
    let tags = journal_tags(store, config, cache)?;

    let note = match store.find_note(&name, &tags)? {
        Some(note) => note,
        None => store.create_note(&name, &tags)?,
    };
    if store.content(&note)?.len() > POPULATED_JOURNAL_LEN {
        info!("journal note {name:?} already populated, not adding");
        cache.journal = Some(note.clone());
        return Ok(note);
    }

    let content = journal_content_with_links(&cache.backlinks);
    store.insert_content(&note, &content, InsertAt::Start)?;
    cache.journal = Some(note.clone());
    Ok(note)
}

/// The data note holding the ledger, created on first use.
pub fn data_note<S: NoteStore>(
    store: &mut S,
    config: &Config,
    cache: &mut NoteCache,
) -> Result<NoteRef> {
    if let Some(note) = &cache.data {
        return Ok(note.clone());
    }
    let name = config.data_note_name();
    if let Some(note) = store.find_note(name, &[])? {
        cache.data = Some(note.clone());
        return Ok(note);
    }

    let tags = match &config.data_tags {
        Some(tags) => tags.clone(),
        None => root_data_tag(store, cache)?
            .map(|root| format!("{root}/{DATA_TAG_SUFFIX}"))
            .into_iter()
            .collect(),
    };
    let note = store.create_note(name, &tags)?;
    info!("created data note {name:?} with tags {tags:?}");
    cache.data = Some(note.clone());
    Ok(note)
}

/// Record the response as a new ledger row, and as a rating entry in the
/// journal note when a rating was given.
pub fn persist_table_data<S: NoteStore>(
    store: &mut S,
    config: &Config,
    cache: &mut NoteCache,
    journal: &NoteRef,
    now: NaiveDateTime,
    response: &DayResponse,
) -> Result<(NoteRef, TableRow)> {
    let data = data_note(store, config, cache)?;
    let row = TableRow::format(&RowFields {
        note: journal.clone(),
        rating: response.rating,
        events: response.events.clone(),
        captured_at: format_captured_at(now),
    });

    if let Some(rating) = response.rating {
        let formatted = formatted_day_rating(rating);
        debug!("received day rating, formatted as {formatted}");
        let existing = store.content(journal)?;
        let entry = day_rating_entry(&existing, now.time(), &formatted, response.events.as_deref());
        store.insert_content(journal, &entry, InsertAt::End)?;
    }

    let content = store.content(&data)?;
    let updated = ledger::upsert(&content, config.table_section(), &row);
    store.set_content(&data, &updated)?;
    Ok((data, row))
}

/// Whether today still needs an entry: true unless the ledger already has a
/// row captured on `today`. Never creates notes.
pub fn needs_entry<S: NoteStore>(
    store: &S,
    config: &Config,
    cache: &NoteCache,
    today: NaiveDate,
) -> Result<bool> {
    let data = match &cache.data {
        Some(note) => Some(note.clone()),
        None => store.find_note(config.data_note_name(), &[])?,
    };
    let Some(data) = data else {
        return Ok(true);
    };
    let content = store.content(&data)?;
    Ok(!ledger::has_entry_for(
        &content,
        config.table_section(),
        &format_date(today),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::{
        config::DEFAULT_TABLE_SECTION,
        ledger::{ledger_rows, TABLE_HEADER},
        store::MemoryStore,
    };

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn rated(rating: i64, events: &str) -> DayResponse {
        DayResponse {
            rating: Some(rating),
            events: Some(events.to_string()),
        }
    }

    #[test]
    fn first_entry_sets_everything_up() {
        let mut store = MemoryStore::new();
        let config = Config::default();
        let mut cache = NoteCache::default();

        let outcome =
            log_daily_entry(&mut store, &config, &mut cache, at(19, 21), &rated(2, "shipped"))
                .unwrap();

        assert_eq!(outcome.journal.name, "October 19, 2026 Bullet Journal");
        assert_eq!(cache.backlinks.len(), 3);
        // three backlink notes, the journal and the data note
        assert_eq!(store.len(), 5);

        let journal = store.content(&outcome.journal).unwrap();
        assert!(journal.starts_with("# [What am I grateful for?](/notes/"));
        assert!(journal.ends_with(
            "# Day Rating\n- Rating as of 09:30 PM: **==2<!-- {\"backgroundCycleColor\":\"15\"} -->==**\n    - Precipitating factors: shipped\n"
        ));

        let data = store.content(&outcome.data).unwrap();
        assert!(data.starts_with(&format!("# {DEFAULT_TABLE_SECTION}\n{TABLE_HEADER}\n")));
        assert_eq!(
            ledger_rows(&data, DEFAULT_TABLE_SECTION).unwrap(),
            vec![outcome.row.render()]
        );
        assert!(outcome.row.render().contains("10/19/2026, 9:30:00 PM"));
    }

    #[test]
    fn repeated_entries_reuse_notes_and_keep_rows() {
        let mut store = MemoryStore::new();
        let config = Config::default();

        let mut rows = Vec::new();
        for (day, response) in [
            (19, rated(1, "a")),
            (19, DayResponse::default()),
            (20, rated(-2, "b\nc")),
        ] {
            let mut cache = NoteCache::default();
            let outcome =
                log_daily_entry(&mut store, &config, &mut cache, at(day, 8), &response).unwrap();
            rows.push(outcome.row.render());
        }

        // backlinks and data note are shared, one journal per day
        assert_eq!(store.len(), 6);
        let data = store.find_note(config.data_note_name(), &[]).unwrap().unwrap();
        let content = store.content(&data).unwrap();
        rows.reverse();
        assert_eq!(ledger_rows(&content, config.table_section()).unwrap(), rows);
        assert_eq!(content.matches(TABLE_HEADER).count(), 1);
    }

    #[test]
    fn unrated_entry_leaves_journal_alone() {
        let mut store = MemoryStore::new();
        let config = Config::default();
        let mut cache = NoteCache::default();

        let outcome = log_daily_entry(
            &mut store,
            &config,
            &mut cache,
            at(19, 9),
            &DayResponse::default(),
        )
        .unwrap();

        assert!(!store.content(&outcome.journal).unwrap().contains("# Day Rating"));
        assert_eq!(outcome.row.cells[1], "See note");
    }

    #[test]
    fn populated_journal_is_not_refilled() {
        let mut store = MemoryStore::new();
        let config = Config::default();
        let mut cache = NoteCache::default();
        let tags = journal_tags(&store, &config, &mut cache).unwrap();
        let name = journal_note_name(&config, at(19, 0).date());
        let existing = store.create_note(&name, &tags).unwrap();
        let written = "x".repeat(POPULATED_JOURNAL_LEN + 1);
        store.set_content(&existing, &written).unwrap();

        let note = ensure_journal_note(&mut store, &config, &mut cache, at(19, 0).date()).unwrap();

        assert_eq!(note, existing);
        assert_eq!(store.content(&note).unwrap(), written);
    }

    #[test]
    fn root_tag_drives_created_note_tags() {
        let mut store = MemoryStore::new();
        store.create_note("Someone else's note", &["me".to_string()]).unwrap();
        let config = Config::default();
        let mut cache = NoteCache::default();

        let outcome =
            log_daily_entry(&mut store, &config, &mut cache, at(19, 9), &rated(0, "")).unwrap();

        assert_eq!(root_data_tag(&store, &mut cache).unwrap(), Some("me".to_string()));
        assert_eq!(
            store.tags(&outcome.journal).unwrap(),
            ["daily-jots".to_string(), "me/bullet-journal".to_string()]
        );
        assert_eq!(
            store.tags(&outcome.data).unwrap(),
            ["me/five-questions".to_string()]
        );
        let gratitude = &cache.backlinks[&Backlink::Gratitude];
        assert_eq!(store.tags(gratitude).unwrap(), ["me/bullet-journal".to_string()]);
        assert!(store.content(gratitude).unwrap().starts_with("Periodically browse"));
    }

    #[test]
    fn disabled_backlink_note_is_skipped() {
        let mut store = MemoryStore::new();
        let config = Config {
            learning_note: Some("none".to_string()),
            ..Config::default()
        };
        let mut cache = NoteCache::default();

        let outcome =
            log_daily_entry(&mut store, &config, &mut cache, at(19, 9), &rated(1, "")).unwrap();

        assert!(!cache.backlinks.contains_key(&Backlink::Learning));
        let journal = store.content(&outcome.journal).unwrap();
        assert!(journal.contains("# What did I learn today?\n"));
    }

    #[test]
    fn needs_entry_until_today_is_recorded() {
        let mut store = MemoryStore::new();
        let config = Config::default();
        let today = at(19, 7).date();

        assert!(needs_entry(&store, &config, &NoteCache::default(), today).unwrap());
        assert!(store.is_empty(), "checking must not create notes");

        let mut cache = NoteCache::default();
        log_daily_entry(&mut store, &config, &mut cache, at(18, 22), &rated(1, "")).unwrap();
        assert!(needs_entry(&store, &config, &cache, today).unwrap());

        log_daily_entry(&mut store, &config, &mut cache, at(19, 7), &rated(1, "")).unwrap();
        assert!(!needs_entry(&store, &config, &cache, today).unwrap());
    }
}
