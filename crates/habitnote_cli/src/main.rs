//! Command-line view of a HabitNote database.
//!
//! Prints the folder tree, ordered notes with tag chips, and the habits due
//! on a given day.
//!
//! Usage: `habitnote <db-path> [YYYY-MM-DD] [--log-dir <abs-dir>]`

use chrono::{Local, NaiveDate};
use habitnote_core::{init_logging_with_config, Organizer, OrganizerConfig, SqliteStore, StatusLevel};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    db_path: PathBuf,
    date: NaiveDate,
    log_dir: Option<PathBuf>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut db_path = None;
    let mut date = None;
    let mut log_dir = None;
    while let Some(arg) = raw.next() {
        if arg == "--log-dir" {
            let dir = raw.next().ok_or("--log-dir needs a directory")?;
            log_dir = Some(PathBuf::from(dir));
        } else if db_path.is_none() {
            db_path = Some(PathBuf::from(arg));
        } else if date.is_none() {
            let parsed = NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
                .map_err(|err| format!("invalid date `{arg}`: {err}"))?;
            date = Some(parsed);
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }
    Ok(Args {
        db_path: db_path.ok_or("usage: habitnote <db-path> [YYYY-MM-DD] [--log-dir <abs-dir>]")?,
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        log_dir,
    })
}

fn run(args: Args) -> Result<(), String> {
    let config = OrganizerConfig::default();
    if let Some(log_dir) = args.log_dir.as_deref() {
        init_logging_with_config(&config, log_dir).map_err(|err| err.to_string())?;
    }

    let store = SqliteStore::open(&args.db_path).map_err(|err| err.to_string())?;
    let mut organizer = Organizer::new(store, config);
    organizer.load();
    if let Some(status) = organizer.status() {
        if status.level == StatusLevel::Error {
            return Err(status.text.clone());
        }
    }

    println!("Folders");
    for row in organizer.folder_rows() {
        let marker = if row.has_children { "+" } else { "-" };
        println!("{}{marker} {}", "  ".repeat(row.level), row.name);
    }

    println!();
    println!("Notes");
    for item in organizer.notes().visible() {
        let pin = if item.document.is_pinned { "*" } else { " " };
        let chips = item
            .tag_chips
            .iter()
            .map(|chip| format!("#{}", chip.name))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{pin} {} {chips}", item.document.title);
        if let Some(excerpt) = &item.subtitle {
            println!("    {excerpt}");
        }
    }

    println!();
    println!("Habits due {}", args.date);
    for habit in organizer.habits_due_on(args.date) {
        println!(
            "- {} ({}, streak {})",
            habit.name,
            habit.frequency.describe(),
            habit.streak_on(args.date)
        );
    }

    info!(
        "event=cli_done module=cli status=ok notes={} habits={}",
        organizer.notes().all().len(),
        organizer.habits().all().len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("habitnote: {message}");
            ExitCode::FAILURE
        }
    }
}
