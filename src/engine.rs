//! Row selection over task sheets.
//!
//! All functions work on a snapshot of data rows and return row indices into
//! that snapshot, in sheet order. Dates are compared in their normalized
//! `yyyy-mm-dd` form; rows whose date cell is blank or unparseable never match.

use crate::dates::format_date;
use crate::types::{Row, STATUS_DONE, cell_at, task_col};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};

fn normalized_date(row: &Row, tz: Tz) -> Option<String> {
    let date = format_date(cell_at(row, task_col::DATE), tz);
    (!date.is_empty()).then_some(date)
}

fn is_done(row: &Row) -> bool {
    cell_at(row, task_col::STATUS).trimmed() == STATUS_DONE
}

/// Group pending tasks for `target` by assignee.
///
/// A row qualifies when its date equals `target`, its trimmed status is not
/// `Done`, and its assignee is one of `known_assignees`. Tasks for unknown
/// assignees are dropped.
pub fn pending_by_assignee(
    rows: &[Row],
    known_assignees: &HashSet<&str>,
    target: &str,
    tz: Tz,
) -> HashMap<String, Vec<usize>> {
    let mut grouped: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        if normalized_date(row, tz).as_deref() != Some(target) || is_done(row) {
            continue;
        }
        let assignee = cell_at(row, task_col::ASSIGNEE).to_string();
        if known_assignees.contains(assignee.as_str()) {
            grouped.entry(assignee).or_default().push(index);
        }
    }
    grouped
}

/// Rows dated `target`, whatever their status.
pub fn rows_dated(rows: &[Row], target: &str, tz: Tz) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| normalized_date(row, tz).as_deref() == Some(target))
        .map(|(index, _)| index)
        .collect()
}

/// Finished rows dated strictly before `today`.
pub fn archivable_rows(rows: &[Row], today: &str, tz: Tz) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            normalized_date(row, tz).is_some_and(|date| date.as_str() < today) && is_done(row)
        })
        .map(|(index, _)| index)
        .collect()
}
