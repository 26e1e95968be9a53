//! Key/value settings read from the Config sheet.

use crate::error::Error;
use crate::types::{Cell, Row, cell_at};
use std::collections::HashMap;

/// Whether reminders are skipped on Saturdays and Sundays.
pub const EXCLUDE_WEEKENDS: &str = "exclude_weekends";
/// Name printed under the reminder signature.
pub const SENDER_NAME: &str = "sender_name";
/// Designation printed under the sender name.
pub const SENDER_DESIGNATION: &str = "sender_designation";
/// Hour at which queued tasks are promoted.
pub const ADD_QUEUED_TASKS_TIME: &str = "addQueuedTasks_time";
/// Hour at which completed tasks are archived.
pub const ARCHIVE_TASKS_TIME: &str = "archiveTasks_time";
/// Hour, or list of hours, at which reminders are sent.
pub const SEND_EMAILS_TIME: &str = "sendEmails_time";

/// Config sheet rows written when a store is first initialised.
pub fn default_rows() -> Vec<Row> {
    vec![
        vec![Cell::from(EXCLUDE_WEEKENDS), Cell::Number(1.0)],
        vec![Cell::from(SENDER_NAME), Cell::Empty],
        vec![Cell::from(SENDER_DESIGNATION), Cell::Empty],
        vec![Cell::from(ADD_QUEUED_TASKS_TIME), Cell::Number(6.0)],
        vec![Cell::from(ARCHIVE_TASKS_TIME), Cell::Number(7.0)],
        vec![Cell::from(SEND_EMAILS_TIME), Cell::Number(9.0)],
    ]
}

/// A settings value: one cell, or every cell of a repeated key in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Scalar(Cell),
    List(Vec<Cell>),
}

impl SettingValue {
    /// The value as a list, wrapping scalars.
    pub fn cells(&self) -> &[Cell] {
        match self {
            SettingValue::Scalar(cell) => std::slice::from_ref(cell),
            SettingValue::List(cells) => cells,
        }
    }

    /// The first cell of the value.
    pub fn first(&self) -> &Cell {
        match self {
            SettingValue::Scalar(cell) => cell,
            SettingValue::List(cells) => &cells[0],
        }
    }

    fn push(&mut self, cell: Cell) {
        match self {
            SettingValue::Scalar(first) => {
                let first = std::mem::take(first);
                *self = SettingValue::List(vec![first, cell]);
            }
            SettingValue::List(cells) => cells.push(cell),
        }
    }
}

/// Settings parsed from the Config sheet, keyed by column A.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, SettingValue>,
}

impl Settings {
    /// Build settings from Config data rows (key in column A, value in B).
    ///
    /// The first row for a key sets a scalar; each further row for the same
    /// key turns the entry into a list and appends to it.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut values: HashMap<String, SettingValue> = HashMap::new();
        for row in rows {
            let key = cell_at(row, 0).trimmed();
            if key.is_empty() {
                continue;
            }
            let value = cell_at(row, 1).clone();
            match values.get_mut(&key) {
                Some(existing) => existing.push(value),
                None => {
                    values.insert(key, SettingValue::Scalar(value));
                }
            }
        }
        Self { values }
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// True when the key is present and its first value is truthy.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.first().is_truthy())
    }

    /// The first value of a key rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.first().to_string())
    }

    /// Hours of day (0-23) listed under a key.
    pub fn hours(&self, key: &str) -> Result<Vec<u8>, Error> {
        let value = self.get(key).ok_or_else(|| Error::missing_setting(key))?;
        value
            .cells()
            .iter()
            .map(|cell| parse_hour(key, cell))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_hour(key: &str, cell: &Cell) -> Result<u8, Error> {
    let hour = match cell {
        Cell::Number(n) if n.fract() == 0.0 => *n as i64,
        Cell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_setting(key, format!("'{}' is not an hour", s)))?,
        other => {
            return Err(Error::invalid_setting(
                key,
                format!("'{}' is not an hour", other),
            ));
        }
    };
    u8::try_from(hour)
        .ok()
        .filter(|h| *h < 24)
        .ok_or_else(|| Error::invalid_setting(key, format!("hour {} is outside 0-23", hour)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, value: Cell) -> Row {
        vec![Cell::Text(key.to_string()), value]
    }

    #[test]
    fn repeated_keys_become_ordered_lists() {
        let settings = Settings::from_rows(&[
            row("a", Cell::Number(1.0)),
            row("b", Cell::Number(2.0)),
            row("a", Cell::Number(3.0)),
        ]);

        assert_eq!(
            settings.get("a"),
            Some(&SettingValue::List(vec![Cell::Number(1.0), Cell::Number(3.0)]))
        );
        assert_eq!(settings.get("b"), Some(&SettingValue::Scalar(Cell::Number(2.0))));
        assert_eq!(settings.get("c"), None);
    }

    #[test]
    fn blank_keys_are_skipped() {
        let settings = Settings::from_rows(&[row("", Cell::Number(1.0)), vec![]]);
        assert!(settings.is_empty());
    }

    #[test]
    fn missing_flag_is_disabled() {
        let settings = Settings::from_rows(&[row(EXCLUDE_WEEKENDS, Cell::Number(0.0))]);
        assert!(!settings.is_enabled(EXCLUDE_WEEKENDS));
        assert!(!Settings::default().is_enabled(EXCLUDE_WEEKENDS));

        let settings = Settings::from_rows(&[row(EXCLUDE_WEEKENDS, Cell::Text("1".into()))]);
        assert!(settings.is_enabled(EXCLUDE_WEEKENDS));
    }

    #[test]
    fn hours_accept_scalars_lists_and_text() {
        let settings = Settings::from_rows(&[
            row(ARCHIVE_TASKS_TIME, Cell::Number(7.0)),
            row(SEND_EMAILS_TIME, Cell::Number(9.0)),
            row(SEND_EMAILS_TIME, Cell::Text(" 14 ".into())),
        ]);
        assert_eq!(settings.hours(ARCHIVE_TASKS_TIME).unwrap(), vec![7]);
        assert_eq!(settings.hours(SEND_EMAILS_TIME).unwrap(), vec![9, 14]);
    }

    #[test]
    fn hours_reject_bad_values() {
        let settings = Settings::from_rows(&[
            row("late", Cell::Number(24.0)),
            row("word", Cell::Text("noon".into())),
            row("half", Cell::Number(6.5)),
        ]);
        assert!(matches!(settings.hours("late"), Err(Error::InvalidSetting { .. })));
        assert!(matches!(settings.hours("word"), Err(Error::InvalidSetting { .. })));
        assert!(matches!(settings.hours("half"), Err(Error::InvalidSetting { .. })));
        assert!(matches!(settings.hours("absent"), Err(Error::MissingSetting { .. })));
    }

    #[test]
    fn text_uses_first_value() {
        let settings = Settings::from_rows(&[
            row(SENDER_NAME, Cell::Text("Ops Desk".into())),
            row(SENDER_NAME, Cell::Text("Ignored".into())),
        ]);
        assert_eq!(settings.text(SENDER_NAME).as_deref(), Some("Ops Desk"));
        assert_eq!(settings.text(SENDER_DESIGNATION), None);
    }
}
