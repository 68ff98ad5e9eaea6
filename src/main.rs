use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;

use jotledger::{
    ledger::ledger_rows, log_daily_entry, logging, needs_entry, replace_section_content,
    section_content, Config, DayResponse, NoteCache, NoteStore, Vault,
};

fn parse_path(arg: &str) -> Result<PathBuf, std::io::Error> {
    let path = PathBuf::from(arg);
    match path.try_exists() {
        Ok(true) => Ok(path),
        Ok(false) => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Path not found".to_string(),
        )),
        Err(e) => Err(e),
    }
}

#[derive(Parser, Debug)]
#[command(author, about, version)]
struct Cli {
    /// The path to the vault of markdown notes to operate on
    #[arg(short, long, visible_alias = "vault")]
    #[clap(value_parser = parse_path)]
    vault_path: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "JOTLEDGER_LOG", default_value = logging::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record today's journal entry and add it to the ledger
    Log {
        /// How today will be remembered, from -2 (terrible) to 2 (wonderful)
        #[arg(short, long, allow_negative_numbers = true)]
        #[clap(value_parser = clap::value_parser!(i64).range(-2..=2))]
        rating: Option<i64>,

        /// What contributed to the rating
        #[arg(short, long, requires = "rating")]
        events: Option<String>,

        /// Print the changes as diffs instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Exit with a failure status when today has no ledger entry yet
    Check {},
    /// Print the content of a section of a note
    Show { note: String, section: String },
    /// Replace the content of a section of a note with a file, or stdin for `-`
    Replace {
        note: String,
        section: String,
        #[arg(default_value = "-")]
        source: String,

        /// Print the change as a diff instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the ledger rows, newest first
    Rows {
        /// Note holding the ledger, if not the configured data note
        note: Option<String>,
    },
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("reading replacement content from stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(source).with_context(|| format!("reading {source}"))
    }
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    logging::init_logging(&args.log_level)?;
    info!("vault path: {}", args.vault_path.display());
    info!("command: {:?}", args.command);

    let mut config = Config::load(&args.vault_path)?;

    match args.command {
        Commands::Log {
            rating,
            events,
            dry_run,
        } => {
            if config.data_note.is_none() && !dry_run {
                config.data_note = Some(config.data_note_name().to_string());
                config
                    .save(&args.vault_path)
                    .context("saving the data note name")?;
            }

            let mut vault = Vault::open(&args.vault_path)?.dry_run(dry_run);
            let mut cache = NoteCache::default();
            let response = DayResponse { rating, events };
            let outcome = log_daily_entry(
                &mut vault,
                &config,
                &mut cache,
                Local::now().naive_local(),
                &response,
            )
            .context("recording today's entry")?;

            println!("Journal note: {}", vault.path_of(&outcome.journal)?.display());
            println!("Ledger row: {}", outcome.row.render());
        }
        Commands::Check {} => {
            let vault = Vault::open(&args.vault_path)?;
            let today = Local::now().date_naive();
            if needs_entry(&vault, &config, &NoteCache::default(), today)? {
                println!("No entry recorded for today");
                return Ok(ExitCode::FAILURE);
            }
            println!("Today's entry is recorded");
        }
        Commands::Show { note, section } => {
            let vault = Vault::open(&args.vault_path)?;
            let note = vault.note_named(&note)?;
            let content = vault.content(&note)?;
            match section_content(&content, &section) {
                Some(section) => print!("{section}"),
                None => {
                    eprintln!("No section {section:?} in {:?}", note.name);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Replace {
            note,
            section,
            source,
            dry_run,
        } => {
            let mut vault = Vault::open(&args.vault_path)?.dry_run(dry_run);
            let note = vault.note_named(&note)?;
            let replacement = read_source(&source)?;
            let content = vault.content(&note)?;
            let updated = replace_section_content(&content, &section, &replacement)
                .with_context(|| format!("updating note {:?}", note.name))?;
            vault.set_content(&note, &updated)?;
        }
        Commands::Rows { note } => {
            let vault = Vault::open(&args.vault_path)?;
            let name = note.as_deref().unwrap_or(config.data_note_name());
            let rows = match vault.find_note(name, &[])? {
                Some(data) => {
                    let content = vault.content(&data)?;
                    ledger_rows(&content, config.table_section())
                        .map(|rows| rows.into_iter().map(str::to_string).collect::<Vec<_>>())
                }
                None => None,
            };
            match rows {
                Some(rows) => rows.iter().for_each(|row| println!("{row}")),
                None => println!("No ledger table yet"),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
