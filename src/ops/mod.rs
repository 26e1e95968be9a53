//! The user-facing operations: reminders, archival, queue promotion and
//! trigger setup.
//!
//! Each call builds a fresh [`RunContext`], so "today" and the Config sheet
//! are read once per run and never shared between runs.

pub mod archive;
pub mod notify;
pub mod promote;
pub mod setup;

use crate::context::RunContext;
use crate::mail::Mailer;
use crate::store::{Operation, TabularStore, Trigger, TriggerRegistry};
use anyhow::Result;
use chrono::{DateTime, Utc};
use notify::NotifyReport;
use serde::Serialize;

/// Text shown by the `about` command.
pub const ABOUT: &str = "Daily Tasks Management System\n\n\
A simple task management application to manage tasks allocated to a small team \
of people. Queued tasks are promoted into the task list on their day, team \
members are reminded of what is still pending, and finished tasks are moved to \
the archive.";

/// Result of running one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Outcome {
    SendReminders(NotifyReport),
    ArchiveTasks { moved: usize },
    AddQueuedTasks { moved: usize },
}

/// Runs operations against a store with the given collaborators.
pub struct Runner<'a> {
    store: &'a dyn TabularStore,
    registry: &'a dyn TriggerRegistry,
    mailer: &'a dyn Mailer,
    link_template: String,
}

impl<'a> Runner<'a> {
    pub fn new(
        store: &'a dyn TabularStore,
        registry: &'a dyn TriggerRegistry,
        mailer: &'a dyn Mailer,
        link_template: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry,
            mailer,
            link_template: link_template.into(),
        }
    }

    /// Run an operation now.
    pub fn run(&self, operation: Operation) -> Result<Outcome> {
        self.run_at(operation, Utc::now())
    }

    /// Run an operation as if the current instant were `instant`.
    pub fn run_at(&self, operation: Operation, instant: DateTime<Utc>) -> Result<Outcome> {
        let mut ctx = RunContext::at(self.store, instant)?;
        match operation {
            Operation::SendReminders => {
                let link = self.sheet_link()?;
                notify::send_reminders(&mut ctx, self.mailer, &link).map(Outcome::SendReminders)
            }
            Operation::ArchiveTasks => {
                archive::archive_tasks(&ctx).map(|moved| Outcome::ArchiveTasks { moved })
            }
            Operation::AddQueuedTasks => {
                promote::add_queued_tasks(&ctx).map(|moved| Outcome::AddQueuedTasks { moved })
            }
        }
    }

    /// Re-register triggers from the Config sheet.
    pub fn save_config(&self) -> Result<Vec<Trigger>> {
        let mut ctx = RunContext::begin(self.store)?;
        setup::save_config(&mut ctx, self.registry)
    }

    /// Link to the shared sheet, using the id saved by `save_config` when present.
    pub fn sheet_link(&self) -> Result<String> {
        let sheet_id = match self.registry.property(setup::SHEET_ID_PROPERTY)? {
            Some(id) => id,
            None => self.store.identifier(),
        };
        Ok(notify::sheet_link(&self.link_template, &sheet_id))
    }
}
