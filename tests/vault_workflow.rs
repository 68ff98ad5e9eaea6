use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use indoc::indoc;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use jotledger::{
    ledger::{ledger_rows, TABLE_HEADER, TABLE_SEPARATOR},
    log_daily_entry, needs_entry, replace_section_content, section_content,
    vault::NoteFile,
    Config, DayResponse, NoteCache, NoteStore, Vault,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, 15, 0)
        .unwrap()
}

fn rated(rating: i64, events: &str) -> DayResponse {
    DayResponse {
        rating: Some(rating),
        events: Some(events.to_string()),
    }
}

fn tags_of(dir: &TempDir, file_name: &str) -> Vec<String> {
    NoteFile::at_path(dir.path().join(file_name)).unwrap().tags()
}

fn template_count(journal: &str) -> usize {
    journal.matches("What am I grateful for?").count()
}

fn md_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".md"))
        .collect();
    names.sort();
    names
}

#[test]
fn daily_entries_build_up_the_ledger_on_disk() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Inbox.md"), "#personal\nloose thoughts\n").unwrap();
    let config = Config::default();

    let mut vault = Vault::open(dir.path()).unwrap();
    let first = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 20),
        &rated(1, "long walk\nearly night"),
    )
    .unwrap();
    let second = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(20, 21),
        &DayResponse::default(),
    )
    .unwrap();

    assert_eq!(
        md_files(&dir),
        vec![
            "Bullet Journal Data.md",
            "Gratitude Themes.md",
            "Highlight Themes.md",
            "Inbox.md",
            "Learning Themes.md",
            "October 19, 2026 Bullet Journal.md",
            "October 20, 2026 Bullet Journal.md",
        ]
    );

    let data_raw = fs::read_to_string(dir.path().join("Bullet Journal Data.md")).unwrap();
    assert!(data_raw.starts_with("---\nuuid: "));
    assert_eq!(tags_of(&dir, "Bullet Journal Data.md"), vec!["personal/five-questions"]);

    let data_body = vault.content(&first.data).unwrap();
    assert_eq!(
        data_body,
        format!(
            "# \"Bullet Journal\" Entries\n{TABLE_HEADER}\n{TABLE_SEPARATOR}\n{}\n{}\n",
            second.row.render(),
            first.row.render()
        )
    );
    assert!(first.row.render().contains("| long walk\\early night |"));
    assert!(first
        .row
        .render()
        .starts_with(&format!("| [October 19, 2026 Bullet Journal](/notes/{})", first.journal.uuid)));

    let journal = vault.content(&first.journal).unwrap();
    assert!(journal.contains("(/notes/"), "backlinks should be linked:\n{journal}");
    assert!(journal.ends_with(
        "# Day Rating\n- Rating as of 08:15 PM: **==1<!-- {\"backgroundCycleColor\":\"4\"} -->==**\n    - Precipitating factors: long walk\nearly night\n"
    ));

    assert!(!needs_entry(&vault, &config, &NoteCache::default(), at(20, 0).date()).unwrap());
    assert!(needs_entry(&vault, &config, &NoteCache::default(), at(21, 0).date()).unwrap());
}

#[test]
fn existing_ledger_rows_survive_an_upsert() {
    let dir = TempDir::new().unwrap();
    let existing_row = "| [October 1, 2026 Bullet Journal](/notes/old) | **0** |  | 10/1/2026, 9:00:00 PM |";
    fs::write(
        dir.path().join("Bullet Journal Data.md"),
        format!(
            indoc! {"
                # Intro
                Summary lives here.

                # \"Bullet Journal\" Entries
                {}
                {}
                {}

                # Notes
                keep this
            "},
            TABLE_HEADER, TABLE_SEPARATOR, existing_row
        ),
    )
    .unwrap();
    let config = Config::default();
    let mut vault = Vault::open(dir.path()).unwrap();

    let outcome = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 9),
        &rated(-1, "rain"),
    )
    .unwrap();

    let content = vault.content(&outcome.data).unwrap();
    assert!(content.starts_with("# Intro\nSummary lives here.\n\n"));
    assert!(content.ends_with("\n# Notes\nkeep this\n"));
    assert_eq!(
        ledger_rows(&content, config.table_section()).unwrap(),
        vec![outcome.row.render().as_str(), existing_row]
    );
    // no front matter is added to a note that had none
    assert_eq!(
        fs::read_to_string(dir.path().join("Bullet Journal Data.md")).unwrap(),
        content
    );
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let mut vault = Vault::open(dir.path()).unwrap().dry_run(true);

    let outcome = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 9),
        &rated(2, "x"),
    )
    .unwrap();

    assert!(md_files(&dir).is_empty());
    // staged writes stay visible within the run
    let content = vault.content(&outcome.data).unwrap();
    assert_eq!(ledger_rows(&content, config.table_section()).unwrap().len(), 1);
}

#[test]
fn configured_section_and_note_names_are_used() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".jotledger.toml"),
        indoc! {r###"
            data_note = "Mood Log"
            date_format = "%Y-%m-%d"
            journal_tags = "journal"
            gratitude_note = "none"
            highlights_note = "none"
            learning_note = "none"

            [table_section.heading]
            text = "## Ratings"
        "###},
    )
    .unwrap();
    let config = Config::load(dir.path()).unwrap();
    let mut vault = Vault::open(dir.path()).unwrap();

    let outcome = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 9),
        &rated(0, ""),
    )
    .unwrap();

    assert_eq!(
        md_files(&dir),
        vec!["2026-10-19 Bullet Journal.md", "Mood Log.md"]
    );
    assert_eq!(tags_of(&dir, "2026-10-19 Bullet Journal.md"), vec!["journal"]);

    let content = vault.content(&outcome.data).unwrap();
    assert!(content.starts_with("# Ratings\n"));
    assert!(section_content(&content, "## Ratings").is_some());
}

#[test]
fn replace_leaves_the_rest_of_the_note_alone() {
    let dir = TempDir::new().unwrap();
    let raw = "---\nuuid: fixed\n---\n# Plan\n- old\n## Detail\nmore\n# Done\n- shipped\n";
    fs::write(dir.path().join("Week.md"), raw).unwrap();
    let mut vault = Vault::open(dir.path()).unwrap();

    let note = vault.note_named("Week").unwrap();
    assert_eq!(note.uuid, "fixed");
    let content = vault.content(&note).unwrap();
    let updated = replace_section_content(&content, "Plan", "- new\n").unwrap();
    vault.set_content(&note, &updated).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Week.md")).unwrap(),
        "---\nuuid: fixed\n---\n# Plan\n- new\n# Done\n- shipped\n"
    );
    assert!(vault.note_named("Missing").is_err());
}

#[test]
fn journal_is_not_refilled_when_its_tags_change() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let mut vault = Vault::open(dir.path()).unwrap();

    let morning = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 8),
        &rated(1, "coffee"),
    )
    .unwrap();
    // a root tag shows up later in the day
    fs::write(dir.path().join("Inbox.md"), "#personal\n").unwrap();
    let evening = log_daily_entry(
        &mut vault,
        &config,
        &mut NoteCache::default(),
        at(19, 21),
        &rated(2, "dinner"),
    )
    .unwrap();

    assert_eq!(evening.journal.uuid, morning.journal.uuid);
    let journal = vault.content(&evening.journal).unwrap();
    assert_eq!(template_count(&journal), 1, "journal was:\n{journal}");
    assert_eq!(journal.matches("# Day Rating").count(), 1);
    assert_eq!(journal.matches("- Rating as of").count(), 2);
    assert_eq!(
        ledger_rows(&vault.content(&evening.data).unwrap(), config.table_section())
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn journal_names_with_slashes_are_found_again() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".jotledger.toml"), "date_format = \"%m/%d/%Y\"\n").unwrap();
    let config = Config::load(dir.path()).unwrap();
    let mut vault = Vault::open(dir.path()).unwrap();

    for hour in [8, 21] {
        log_daily_entry(
            &mut vault,
            &config,
            &mut NoteCache::default(),
            at(19, hour),
            &rated(0, ""),
        )
        .unwrap();
    }

    let journal = vault.note_named("10/19/2026 Bullet Journal").unwrap();
    assert_eq!(journal.name, "10-19-2026 Bullet Journal");
    assert_eq!(template_count(&vault.content(&journal).unwrap()), 1);
    assert!(md_files(&dir).contains(&"10-19-2026 Bullet Journal.md".to_string()));
}
