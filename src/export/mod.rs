//! Snapshot export and import of every sheet in a store.
//!
//! A snapshot is a JSON document (optionally gzipped) holding each sheet's
//! layout and rows, header rows included, plus the store's time zone. It can
//! be version-controlled and re-imported to rebuild a store.

use crate::db::Database;
use crate::store::TabularStore;
use crate::types::Row;
use anyhow::{Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Snapshot format version. Bump when the layout changes.
pub const SNAPSHOT_VERSION: i32 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One sheet inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    pub frozen_rows: usize,
    pub max_rows: usize,
    pub rows: Vec<Row>,
}

/// A structured export of a sheet store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: i32,

    /// ISO 8601 timestamp of export
    pub exported_at: String,

    /// Tool name and version that created this export
    pub exported_by: String,

    /// IANA time zone of the store
    pub time_zone: String,

    /// Sheets keyed by name.
    pub sheets: BTreeMap<String, SheetSnapshot>,
}

/// What an import did (or would do, for a dry run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub sheets: usize,
    pub rows: usize,
    pub dry_run: bool,
}

impl Snapshot {
    /// Capture every sheet of the database.
    pub fn from_database(db: &Database) -> Result<Self> {
        let mut sheets = BTreeMap::new();
        for info in db.sheets()? {
            let rows = db.all_rows(&info.name)?;
            sheets.insert(
                info.name,
                SheetSnapshot {
                    frozen_rows: info.frozen_rows,
                    max_rows: info.max_rows,
                    rows,
                },
            );
        }
        Ok(Self {
            schema_version: SNAPSHOT_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("daily-tasks v{}", env!("CARGO_PKG_VERSION")),
            time_zone: db.time_zone()?.name().to_string(),
            sheets,
        })
    }

    /// Serialize to JSON with pretty formatting.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a snapshot from a file, plain JSON or gzip.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut magic = [0u8; 2];
        let gzipped = match File::open(path)?.read_exact(&mut magic) {
            Ok(()) => magic == GZIP_MAGIC,
            Err(_) => false,
        };

        let reader = BufReader::new(File::open(path)?);
        let snapshot = if gzipped {
            serde_json::from_reader(GzDecoder::new(reader))?
        } else {
            serde_json::from_reader(reader)?
        };
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, gzipped when `gzip` is set.
    pub fn write_file(&self, path: &Path, gzip: bool) -> Result<()> {
        let json = self.to_json_pretty()?;
        let mut writer = BufWriter::new(File::create(path)?);
        if gzip {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?.flush()?;
        } else {
            writer.write_all(json.as_bytes())?;
            writer.flush()?;
        }
        debug!(path = %path.display(), gzip, "Wrote snapshot");
        Ok(())
    }

    /// Check if this snapshot's layout is the one this build reads.
    pub fn is_schema_compatible(&self) -> bool {
        self.schema_version == SNAPSHOT_VERSION
    }

    /// Total rows across all sheets, header rows included.
    pub fn row_count(&self) -> usize {
        self.sheets.values().map(|s| s.rows.len()).sum()
    }

    /// Replace the database's sheets with the snapshot's. Sheets absent from
    /// the snapshot are left alone.
    pub fn apply(&self, db: &Database, dry_run: bool) -> Result<ImportSummary> {
        if !self.is_schema_compatible() {
            bail!(
                "snapshot schema version {} is not supported (expected {})",
                self.schema_version,
                SNAPSHOT_VERSION
            );
        }
        let tz = crate::dates::parse_time_zone(&self.time_zone)?;

        let summary = ImportSummary {
            sheets: self.sheets.len(),
            rows: self.row_count(),
            dry_run,
        };
        if dry_run {
            return Ok(summary);
        }

        for (name, sheet) in &self.sheets {
            db.replace_sheet(name, sheet.frozen_rows, sheet.max_rows, &sheet.rows)?;
        }
        db.set_time_zone(tz)?;
        info!(sheets = summary.sheets, rows = summary.rows, "Imported snapshot");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, SHEET_LAYOUT, TASKS_SHEET};
    use tempfile::TempDir;

    fn sample_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (name, headers) in SHEET_LAYOUT {
            db.create_sheet(name, headers).unwrap();
        }
        db.append_row(
            TASKS_SHEET,
            vec![
                Cell::from("2024-05-01"),
                Cell::from("Write report"),
                Cell::from("Ops"),
                Cell::from("alice"),
                Cell::Empty,
            ],
        )
        .unwrap();
        db.set_time_zone(chrono_tz::Europe::Berlin).unwrap();
        db
    }

    #[test]
    fn test_snapshot_captures_sheets() {
        let snapshot = Snapshot::from_database(&sample_db()).unwrap();
        assert_eq!(snapshot.schema_version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.time_zone, "Europe/Berlin");
        assert_eq!(snapshot.sheets.len(), SHEET_LAYOUT.len());
        assert_eq!(snapshot.sheets[TASKS_SHEET].rows.len(), 2);
    }

    #[test]
    fn test_gzip_file_restores_into_fresh_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.json.gz");

        let source = sample_db();
        let snapshot = Snapshot::from_database(&source).unwrap();
        snapshot.write_file(&path, true).unwrap();

        let loaded = Snapshot::from_file(&path).unwrap();
        let target = Database::open_in_memory().unwrap();
        let summary = loaded.apply(&target, false).unwrap();

        assert_eq!(summary.sheets, SHEET_LAYOUT.len());
        assert_eq!(
            target.all_rows(TASKS_SHEET).unwrap(),
            source.all_rows(TASKS_SHEET).unwrap()
        );
        assert_eq!(target.time_zone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let snapshot = Snapshot::from_database(&sample_db()).unwrap();
        let target = Database::open_in_memory().unwrap();

        let summary = snapshot.apply(&target, true).unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.rows, snapshot.row_count());
        assert!(target.sheets().unwrap().is_empty());
    }

    #[test]
    fn test_incompatible_version_rejected() {
        let mut snapshot = Snapshot::from_database(&sample_db()).unwrap();
        snapshot.schema_version = SNAPSHOT_VERSION + 1;
        let target = Database::open_in_memory().unwrap();
        assert!(snapshot.apply(&target, false).is_err());
    }
}
