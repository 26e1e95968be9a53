//! Collaborator interfaces: the sheet store and the trigger registry.
//!
//! Operations only talk to these traits. [`crate::db::Database`] implements
//! both on top of SQLite.

use crate::types::Row;
use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tabular storage made of named sheets with frozen header rows.
pub trait TabularStore {
    /// Stable identifier of the store, used to build links to it.
    fn identifier(&self) -> String;

    /// The time zone every date in the store is interpreted in.
    fn time_zone(&self) -> Result<Tz>;

    /// Data rows of a sheet: rows below the frozen header rows, with trailing
    /// blank rows trimmed. Always returns at least one (possibly empty) row.
    fn data_rows(&self, sheet: &str) -> Result<Vec<Row>>;

    /// Move data rows (indices into [`TabularStore::data_rows`]) to the end of
    /// another sheet, in ascending index order, removing them from `from`.
    /// Returns the number of rows moved.
    fn relocate_rows(&self, from: &str, indices: &[usize], to: &str) -> Result<usize>;

    /// Sort a sheet's data rows ascending by one column. Header rows stay put.
    fn sort_sheet(&self, sheet: &str, column: usize) -> Result<()>;
}

/// An operation that can be bound to a daily trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SendReminders,
    ArchiveTasks,
    AddQueuedTasks,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SendReminders => "send_reminders",
            Operation::ArchiveTasks => "archive_tasks",
            Operation::AddQueuedTasks => "add_queued_tasks",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "send_reminders" => Ok(Operation::SendReminders),
            "archive_tasks" => Ok(Operation::ArchiveTasks),
            "add_queued_tasks" => Ok(Operation::AddQueuedTasks),
            other => Err(crate::error::Error::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }
}

/// A daily trigger firing an operation at a fixed hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: i64,
    pub operation: Operation,
    pub hour: u8,
    /// Day (`yyyy-mm-dd`, store zone) the trigger last fired.
    pub last_fired: Option<String>,
    pub created_at: i64,
}

impl Trigger {
    /// Whether the trigger should fire at `hour` on `today`.
    ///
    /// Only the trigger's own hour matches. A day whose hour passes without a
    /// tick (host suspended, an earlier run overrunning the hour) is skipped,
    /// not caught up later.
    pub fn is_due(&self, today: &str, hour: u8) -> bool {
        self.hour == hour && self.last_fired.as_deref() != Some(today)
    }
}

/// Persistent trigger and property registry.
pub trait TriggerRegistry {
    fn list_triggers(&self) -> Result<Vec<Trigger>>;

    fn delete_trigger(&self, id: i64) -> Result<()>;

    fn create_daily_trigger(&self, operation: Operation, hour: u8) -> Result<Trigger>;

    /// Delete every trigger and register `schedule` in its place, all or
    /// nothing.
    fn replace_triggers(&self, schedule: &[(Operation, u8)]) -> Result<Vec<Trigger>>;

    /// Record that a trigger fired on `day`.
    fn mark_fired(&self, id: i64, day: &str) -> Result<()>;

    fn property(&self, key: &str) -> Result<Option<String>>;

    fn set_property(&self, key: &str, value: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(hour: u8, last_fired: Option<&str>) -> Trigger {
        Trigger {
            id: 1,
            operation: Operation::SendReminders,
            hour,
            last_fired: last_fired.map(str::to_string),
            created_at: 0,
        }
    }

    #[test]
    fn due_once_per_day_at_its_hour() {
        assert!(trigger(9, None).is_due("2024-05-01", 9));
        assert!(trigger(9, Some("2024-04-30")).is_due("2024-05-01", 9));
        assert!(!trigger(9, Some("2024-05-01")).is_due("2024-05-01", 9));
        assert!(!trigger(9, None).is_due("2024-05-01", 10));
    }

    #[test]
    fn missed_hour_waits_for_next_day() {
        let late = trigger(6, Some("2024-04-30"));
        assert!(!late.is_due("2024-05-01", 7));
        assert!(!late.is_due("2024-05-01", 23));
        assert!(late.is_due("2024-05-02", 6));
    }

    #[test]
    fn operation_names_round_trip() {
        for op in [
            Operation::SendReminders,
            Operation::ArchiveTasks,
            Operation::AddQueuedTasks,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("sendEmails".parse::<Operation>().is_err());
    }
}
