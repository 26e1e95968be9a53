//! Daily task list manager for small teams.
//!
//! A sheet store (Team, Tasks, Queue, Archive, Config) backed by SQLite, with
//! operations that remind assignees of pending tasks, archive finished ones
//! and promote queued tasks on their day, fired by persisted daily triggers.

pub mod cli;
pub mod config;
pub mod context;
pub mod dates;
pub mod db;
pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod mail;
pub mod ops;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod types;
