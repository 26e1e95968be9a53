//! Per-run state shared by the operations.

use crate::dates::{format_day, format_timestamp};
use crate::settings::Settings;
use crate::store::TabularStore;
use crate::types::{CONFIG_SHEET, Row};
use anyhow::Result;
use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;

/// State for one invocation of an operation.
///
/// The instant, "today" and the Config sheet are captured once and reused for
/// every comparison in the run, all in the store's time zone.
pub struct RunContext<'a> {
    store: &'a dyn TabularStore,
    tz: Tz,
    now: DateTime<Tz>,
    today: String,
    settings: Option<Settings>,
}

impl<'a> RunContext<'a> {
    /// Start a run at the current instant.
    pub fn begin(store: &'a dyn TabularStore) -> Result<Self> {
        Self::at(store, Utc::now())
    }

    /// Start a run at a fixed instant.
    pub fn at(store: &'a dyn TabularStore, instant: DateTime<Utc>) -> Result<Self> {
        let tz = store.time_zone()?;
        Ok(Self {
            store,
            tz,
            now: instant.with_timezone(&tz),
            today: format_day(&instant, tz),
            settings: None,
        })
    }

    pub fn store(&self) -> &'a dyn TabularStore {
        self.store
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    /// Today as `yyyy-mm-dd`.
    pub fn today(&self) -> &str {
        &self.today
    }

    /// The run's instant as `yyyy-mm-dd HH:MM:SS`, for log lines.
    pub fn now(&self) -> String {
        format_timestamp(&self.now, self.tz)
    }

    pub fn weekday(&self) -> Weekday {
        self.now.weekday()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Data rows of a sheet.
    pub fn rows(&self, sheet: &str) -> Result<Vec<Row>> {
        self.store.data_rows(sheet)
    }

    /// Settings from the Config sheet, read on first use.
    pub fn settings(&mut self) -> Result<&Settings> {
        if self.settings.is_none() {
            let rows = self.store.data_rows(CONFIG_SHEET)?;
            self.settings = Some(Settings::from_rows(&rows));
        }
        Ok(self.settings.get_or_insert_with(Settings::default))
    }
}
