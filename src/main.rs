//! daily-tasks command line entry point.

use anyhow::{Context, Result, bail};
use clap::Parser;
use daily_tasks::cli::export::ExportArgs;
use daily_tasks::cli::import::ImportArgs;
use daily_tasks::cli::sheet::{AppendArgs, SetCellArgs, ShowArgs};
use daily_tasks::cli::{Cli, Command, InitArgs, OutboxArgs};
use daily_tasks::config::{Config, ConfigLoader, ConfigPaths};
use daily_tasks::dates::parse_time_zone;
use daily_tasks::db::Database;
use daily_tasks::export::Snapshot;
use daily_tasks::format::{
    OutputFormat, format_outbox_markdown, format_plural, format_sheet_markdown,
    format_triggers_markdown,
};
use daily_tasks::ops::{ABOUT, Outcome, Runner};
use daily_tasks::store::{Operation, Trigger, TriggerRegistry};
use daily_tasks::{logging, mail, scheduler};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log, cli.verbose)?;

    let explicit = cli
        .config
        .clone()
        .or_else(|| std::env::var(daily_tasks::config::CONFIG_PATH_ENV).ok());
    let mut loader =
        ConfigLoader::load_with(ConfigPaths::discover(), explicit.as_deref().map(Path::new))?;
    for source in loader.sources() {
        debug!(path = %source.display(), "Using config file");
    }

    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.store.db_path = db_path.into();
    }
    let config = loader.into_config();
    config.validate()?;

    if let Command::About = cli.command {
        println!("{}", ABOUT);
        return Ok(());
    }

    config.ensure_db_dir()?;
    let db = Database::open(&config.store.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.store.db_path.display()
        )
    })?;
    debug!(db = db.identifier(), "Opened database");

    let mailer = mail::from_config(&config.mail, &db);
    let runner = Runner::new(&db, &db, mailer.as_ref(), config.store.sheet_link.clone());

    match cli.command {
        Command::About => {}
        Command::SendReminders(args) => {
            print_outcome(&runner.run(Operation::SendReminders)?, args.format)?
        }
        Command::ArchiveTasks(args) => {
            print_outcome(&runner.run(Operation::ArchiveTasks)?, args.format)?
        }
        Command::AddQueuedTasks(args) => {
            print_outcome(&runner.run(Operation::AddQueuedTasks)?, args.format)?
        }
        Command::SaveConfig(args) => {
            let triggers = runner.save_config()?;
            print_triggers(&triggers, args.format)?;
        }
        Command::Init(args) => run_init(&config, &db, args)?,
        Command::Show(args) => run_show(&db, args)?,
        Command::Append(args) => run_append(&db, args)?,
        Command::SetCell(args) => run_set_cell(&db, args)?,
        Command::Triggers(args) => print_triggers(&db.list_triggers()?, args.format)?,
        Command::Outbox(args) => run_outbox(&db, args)?,
        Command::Export(args) => run_export(&db, args)?,
        Command::Import(args) => run_import(&db, args)?,
        Command::Daemon => {
            let tick = Duration::from_secs(config.daemon.tick_seconds);
            scheduler::run_daemon(&runner, &db, &db, tick).await?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome(outcome: &Outcome, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(outcome);
    }
    match outcome {
        Outcome::SendReminders(report) if report.skipped => {
            println!("Weekend: no reminders sent.")
        }
        Outcome::SendReminders(report) => {
            let sent = report.sent();
            println!("Sent {} {}.", sent, format_plural(sent, "reminder", "reminders"));
            for recipient in &report.recipients {
                println!("- {}", recipient);
            }
        }
        Outcome::ArchiveTasks { moved } => {
            println!("Archived {} {}.", moved, format_plural(*moved, "task", "tasks"))
        }
        Outcome::AddQueuedTasks { moved } => {
            println!("Added {} queued {}.", moved, format_plural(*moved, "task", "tasks"))
        }
    }
    Ok(())
}

fn print_triggers(triggers: &[Trigger], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&triggers),
        OutputFormat::Markdown => {
            print!("{}", format_triggers_markdown(triggers));
            Ok(())
        }
    }
}

fn run_init(config: &Config, db: &Database, args: InitArgs) -> Result<()> {
    let zone = args.time_zone.as_deref().unwrap_or(&config.store.time_zone);
    let tz = parse_time_zone(zone)?;
    let created = db.init_layout(tz)?;
    if created.is_empty() {
        println!("All sheets already exist; time zone set to {}.", tz.name());
    } else {
        println!(
            "Created {} {}: {}. Time zone: {}.",
            created.len(),
            format_plural(created.len(), "sheet", "sheets"),
            created.join(", "),
            tz.name()
        );
    }
    Ok(())
}

fn run_show(db: &Database, args: ShowArgs) -> Result<()> {
    let rows = db.all_rows(&args.sheet)?;
    match args.format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Markdown => {
            print!("{}", format_sheet_markdown(&args.sheet, &rows));
            Ok(())
        }
    }
}

fn run_append(db: &Database, args: AppendArgs) -> Result<()> {
    let position = db.append_row(&args.sheet, args.cells())?;
    info!(sheet = %args.sheet, position, "Appended row");
    println!("Appended row {} to {}.", position, args.sheet);
    Ok(())
}

fn run_set_cell(db: &Database, args: SetCellArgs) -> Result<()> {
    let rows = db.all_rows(&args.sheet)?;
    let header = rows.first().map(Vec::as_slice).unwrap_or_default();
    let Some(column) = args.column_index(header) else {
        bail!("sheet '{}' has no column '{}'", args.sheet, args.column);
    };
    db.set_cell(&args.sheet, args.row, column, args.cell())?;
    info!(sheet = %args.sheet, row = args.row, column, "Updated cell");
    Ok(())
}

fn run_outbox(db: &Database, args: OutboxArgs) -> Result<()> {
    if args.clear {
        let removed = db.clear_outbox()?;
        println!("Removed {} {}.", removed, format_plural(removed, "message", "messages"));
        return Ok(());
    }
    let messages = db.outbox_messages(args.limit)?;
    match args.format {
        OutputFormat::Json => print_json(&messages),
        OutputFormat::Markdown => {
            print!("{}", format_outbox_markdown(&messages));
            Ok(())
        }
    }
}

fn run_export(db: &Database, args: ExportArgs) -> Result<()> {
    let snapshot = Snapshot::from_database(db)?;
    let gzip = args.should_compress();

    match &args.output {
        Some(path) => {
            snapshot.write_file(path, gzip)?;
            eprintln!(
                "Exported {} sheets to {}{}",
                snapshot.sheets.len(),
                path.display(),
                if gzip { " (gzipped)" } else { "" }
            );
        }
        None if gzip => {
            use flate2::Compression;
            use flate2::write::GzEncoder;

            let stdout = std::io::stdout();
            let mut encoder = GzEncoder::new(stdout.lock(), Compression::default());
            encoder.write_all(snapshot.to_json_pretty()?.as_bytes())?;
            encoder.finish()?;
        }
        None => println!("{}", snapshot.to_json_pretty()?),
    }
    Ok(())
}

fn run_import(db: &Database, args: ImportArgs) -> Result<()> {
    info!(file = %args.file.display(), mode = args.import_mode(), "Importing snapshot");
    let snapshot = Snapshot::from_file(&args.file)
        .with_context(|| format!("failed to read snapshot {}", args.file.display()))?;
    let summary = snapshot.apply(db, args.dry_run)?;
    let verb = if summary.dry_run { "Would import" } else { "Imported" };
    println!(
        "{} {} {} ({} {}).",
        verb,
        summary.sheets,
        format_plural(summary.sheets, "sheet", "sheets"),
        summary.rows,
        format_plural(summary.rows, "row", "rows")
    );
    Ok(())
}
