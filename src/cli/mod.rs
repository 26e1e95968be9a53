//! CLI command definitions for daily-tasks
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod import;
pub mod sheet;

use crate::format::OutputFormat;
use clap::{Args, Parser, Subcommand};
use export::ExportArgs;
use import::ImportArgs;
use sheet::{AppendArgs, SetCellArgs, ShowArgs};

/// Daily task list manager for small teams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Email each team member the tasks still pending for today
    SendReminders(RunArgs),

    /// Move finished and past-dated tasks to the Archive sheet
    ArchiveTasks(RunArgs),

    /// Move tasks queued for today into the Tasks sheet
    AddQueuedTasks(RunArgs),

    /// Re-register the daily triggers from the Config sheet
    SaveConfig(RunArgs),

    /// Describe the tool
    About,

    /// Create the sheets and a default Config sheet
    Init(InitArgs),

    /// Print a sheet
    Show(ShowArgs),

    /// Append a row to a sheet
    Append(AppendArgs),

    /// Overwrite one cell of a data row
    SetCell(SetCellArgs),

    /// List registered triggers
    Triggers(RunArgs),

    /// List or clear messages queued by the outbox transport
    Outbox(OutboxArgs),

    /// Export every sheet to a JSON snapshot
    Export(ExportArgs),

    /// Import sheets from a JSON snapshot
    Import(ImportArgs),

    /// Fire registered triggers on schedule until interrupted
    Daemon,
}

/// Output options shared by commands that report a result.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Arguments for the init subcommand
#[derive(Args, Debug)]
pub struct InitArgs {
    /// IANA time zone for the store (overrides config)
    #[arg(long, value_name = "ZONE")]
    pub time_zone: Option<String>,
}

/// Arguments for the outbox subcommand
#[derive(Args, Debug)]
pub struct OutboxArgs {
    /// Show at most this many messages, newest first
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Delete every queued message
    #[arg(long)]
    pub clear: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}
