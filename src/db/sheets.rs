//! Sheet storage: named sheets of JSON-encoded rows.
//!
//! Rows are addressed by 1-based position. The first `frozen_rows` positions
//! are header rows; everything below them up to the last non-blank row is the
//! sheet's data range. `max_rows` is the allocated capacity and only grows.

use super::{Database, now_ms};
use crate::dates::{parse_date, parse_time_zone};
use crate::error::Error;
use crate::store::{TabularStore, TriggerRegistry};
use crate::settings;
use crate::types::{CONFIG_SHEET, Cell, Row, SHEET_LAYOUT, cell_at, is_blank_row};
use anyhow::{Result, bail};
use chrono_tz::Tz;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Property holding the store's IANA time zone name.
pub const TIME_ZONE_PROPERTY: &str = "time_zone";

/// Capacity given to newly created sheets.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Sheet metadata plus its current last populated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    pub frozen_rows: usize,
    pub max_rows: usize,
    pub last_row: usize,
}

#[derive(Debug, Clone)]
struct SheetMeta {
    frozen_rows: usize,
    max_rows: usize,
}

fn sheet_meta(conn: &Connection, name: &str) -> Result<SheetMeta> {
    let meta = conn
        .query_row(
            "SELECT frozen_rows, max_rows FROM sheets WHERE name = ?1",
            params![name],
            |row| {
                Ok(SheetMeta {
                    frozen_rows: row.get::<_, i64>(0)? as usize,
                    max_rows: row.get::<_, i64>(1)? as usize,
                })
            },
        )
        .optional()?;
    meta.ok_or_else(|| Error::sheet_not_found(name).into())
}

/// Load every stored row as a dense list: index `i` holds position `i + 1`,
/// gaps are empty rows, trailing blank rows are dropped.
fn load_rows(conn: &Connection, name: &str) -> Result<Vec<Row>> {
    let mut stmt =
        conn.prepare("SELECT position, cells FROM sheet_rows WHERE sheet = ?1 ORDER BY position")?;
    let stored = stmt
        .query_map(params![name], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut rows: Vec<Row> = Vec::new();
    for (position, cells) in stored {
        let index = (position.max(1) - 1) as usize;
        if rows.len() <= index {
            rows.resize(index + 1, Row::new());
        }
        rows[index] = serde_json::from_str(&cells)?;
    }
    let last = last_populated(&rows);
    rows.truncate(last);
    Ok(rows)
}

/// Number of rows up to and including the last non-blank one.
fn last_populated(rows: &[Row]) -> usize {
    rows.iter()
        .rposition(|row| !is_blank_row(row))
        .map_or(0, |i| i + 1)
}

/// Replace every stored row of a sheet.
fn write_rows(conn: &Connection, name: &str, rows: &[Row]) -> Result<()> {
    conn.execute("DELETE FROM sheet_rows WHERE sheet = ?1", params![name])?;
    let mut stmt =
        conn.prepare("INSERT INTO sheet_rows (sheet, position, cells) VALUES (?1, ?2, ?3)")?;
    for (index, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        stmt.execute(params![name, (index + 1) as i64, serde_json::to_string(row)?])?;
    }
    Ok(())
}

fn set_max_rows(conn: &Connection, name: &str, max_rows: usize) -> Result<()> {
    conn.execute(
        "UPDATE sheets SET max_rows = ?1 WHERE name = ?2",
        params![max_rows as i64, name],
    )?;
    Ok(())
}

/// Place `row` right after the last populated row, growing capacity by one
/// row when the sheet is full.
fn append_in_memory(rows: &mut Vec<Row>, meta: &mut SheetMeta, row: Row) -> usize {
    let last_row = last_populated(rows);
    if meta.max_rows <= last_row {
        meta.max_rows = last_row + 1;
    }
    rows.truncate(last_row);
    rows.push(row);
    last_row + 1
}

/// Data range bounds `(start, end)` as indices into the dense row list.
fn data_bounds(rows: &[Row], meta: &SheetMeta) -> (usize, usize) {
    let start = meta.frozen_rows.min(rows.len());
    (start, rows.len())
}

/// Sort rank: dates (chronological) before numbers before text before booleans; blanks last.
fn compare_cells(a: &Cell, b: &Cell, tz: Tz) -> Ordering {
    fn rank(cell: &Cell, tz: Tz) -> u8 {
        if cell.is_blank() {
            4
        } else if parse_date(cell, tz).is_some() {
            0
        } else {
            match cell {
                Cell::Number(_) => 1,
                Cell::Text(_) => 2,
                _ => 3,
            }
        }
    }

    let (ra, rb) = (rank(a, tz), rank(b, tz));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        _ if ra == 0 => parse_date(a, tz).cmp(&parse_date(b, tz)),
        (Cell::Number(x), Cell::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Cell::Bool(x), Cell::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl Database {
    /// Create a sheet with one frozen header row. Returns false if it already exists.
    pub fn create_sheet(&self, name: &str, headers: &[&str]) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO sheets (name, frozen_rows, max_rows, created_at)
                 VALUES (?1, 1, ?2, ?3)",
                params![name, DEFAULT_MAX_ROWS as i64, now_ms()],
            )?;
            if inserted == 0 {
                return Ok(false);
            }
            let header: Row = headers.iter().map(|h| Cell::from_input(h)).collect();
            write_rows(&tx, name, &[header])?;
            tx.commit()?;
            debug!(sheet = name, "Created sheet");
            Ok(true)
        })
    }

    /// Create or overwrite a sheet with explicit layout and rows (header rows included).
    pub fn replace_sheet(
        &self,
        name: &str,
        frozen_rows: usize,
        max_rows: usize,
        rows: &[Row],
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let max_rows = max_rows.max(last_populated(rows));
            tx.execute(
                "INSERT INTO sheets (name, frozen_rows, max_rows, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                    frozen_rows = excluded.frozen_rows,
                    max_rows = excluded.max_rows",
                params![name, frozen_rows as i64, max_rows as i64, now_ms()],
            )?;
            write_rows(&tx, name, rows)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Metadata for every sheet, in name order.
    pub fn sheets(&self) -> Result<Vec<SheetInfo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM sheets ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            names
                .into_iter()
                .map(|name| {
                    let meta = sheet_meta(conn, &name)?;
                    let last_row = load_rows(conn, &name)?.len();
                    Ok(SheetInfo {
                        name,
                        frozen_rows: meta.frozen_rows,
                        max_rows: meta.max_rows,
                        last_row,
                    })
                })
                .collect()
        })
    }

    /// Metadata for one sheet.
    pub fn sheet_info(&self, name: &str) -> Result<SheetInfo> {
        self.with_conn(|conn| {
            let meta = sheet_meta(conn, name)?;
            Ok(SheetInfo {
                name: name.to_string(),
                frozen_rows: meta.frozen_rows,
                max_rows: meta.max_rows,
                last_row: load_rows(conn, name)?.len(),
            })
        })
    }

    /// Every populated row of a sheet, header rows included.
    pub fn all_rows(&self, name: &str) -> Result<Vec<Row>> {
        self.with_conn(|conn| {
            sheet_meta(conn, name)?;
            load_rows(conn, name)
        })
    }

    /// Append a row after the last populated row. Returns its 1-based position.
    pub fn append_row(&self, name: &str, row: Row) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut meta = sheet_meta(&tx, name)?;
            let mut rows = load_rows(&tx, name)?;
            let position = append_in_memory(&mut rows, &mut meta, row);
            set_max_rows(&tx, name, meta.max_rows)?;
            write_rows(&tx, name, &rows)?;
            tx.commit()?;
            Ok(position)
        })
    }

    /// Overwrite one cell of a data row.
    pub fn set_cell(&self, name: &str, index: usize, column: usize, cell: Cell) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let meta = sheet_meta(&tx, name)?;
            let mut rows = load_rows(&tx, name)?;
            let (start, end) = data_bounds(&rows, &meta);
            let Some(position) = start.checked_add(index).filter(|&p| p < end) else {
                return Err(Error::RowOutOfRange {
                    sheet: name.to_string(),
                    index,
                    rows: end - start,
                }
                .into());
            };
            let row = &mut rows[position];
            if row.len() <= column {
                row.resize(column + 1, Cell::Empty);
            }
            row[column] = cell;
            write_rows(&tx, name, &rows)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Set the store's time zone.
    pub fn set_time_zone(&self, tz: Tz) -> Result<()> {
        self.set_property(TIME_ZONE_PROPERTY, tz.name())
    }

    /// Create any missing application sheet, seed a new Config sheet with
    /// default settings and record the time zone. Returns the sheets created.
    pub fn init_layout(&self, tz: Tz) -> Result<Vec<&'static str>> {
        let mut created = Vec::new();
        for (name, headers) in SHEET_LAYOUT {
            if !self.create_sheet(name, headers)? {
                continue;
            }
            if name == CONFIG_SHEET {
                for row in settings::default_rows() {
                    self.append_row(name, row)?;
                }
            }
            created.push(name);
        }
        self.set_time_zone(tz)?;
        info!(created = created.len(), time_zone = tz.name(), "Initialised store");
        Ok(created)
    }
}

impl TabularStore for Database {
    fn identifier(&self) -> String {
        Database::identifier(self).to_string()
    }

    fn time_zone(&self) -> Result<Tz> {
        match self.property(TIME_ZONE_PROPERTY)? {
            Some(name) => Ok(parse_time_zone(&name)?),
            None => Ok(Tz::UTC),
        }
    }

    fn data_rows(&self, sheet: &str) -> Result<Vec<Row>> {
        self.with_conn(|conn| {
            let meta = sheet_meta(conn, sheet)?;
            let rows = load_rows(conn, sheet)?;
            let (start, end) = data_bounds(&rows, &meta);
            let data: Vec<Row> = rows[start..end].to_vec();
            if data.is_empty() {
                Ok(vec![Row::new()])
            } else {
                Ok(data)
            }
        })
    }

    fn relocate_rows(&self, from: &str, indices: &[usize], to: &str) -> Result<usize> {
        if from == to {
            bail!("cannot relocate rows of sheet {} onto itself", from);
        }
        if indices.is_empty() {
            return Ok(0);
        }
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let src_meta = sheet_meta(&tx, from)?;
            let mut dst_meta = sheet_meta(&tx, to)?;
            let mut src_rows = load_rows(&tx, from)?;
            let mut dst_rows = load_rows(&tx, to)?;
            let (start, end) = data_bounds(&src_rows, &src_meta);

            let out_of_range = |i: usize| start.checked_add(i).is_none_or(|p| p >= end);
            if let Some(&bad) = indices.iter().find(|&&i| out_of_range(i)) {
                return Err(Error::RowOutOfRange {
                    sheet: from.to_string(),
                    index: bad,
                    rows: end - start,
                }
                .into());
            }

            for &index in &indices {
                let row = src_rows[start + index].clone();
                append_in_memory(&mut dst_rows, &mut dst_meta, row);
            }
            for &index in indices.iter().rev() {
                src_rows.remove(start + index);
            }

            set_max_rows(&tx, to, dst_meta.max_rows)?;
            write_rows(&tx, to, &dst_rows)?;
            write_rows(&tx, from, &src_rows)?;
            tx.commit()?;
            debug!(from, to, moved = indices.len(), "Relocated rows");
            Ok(indices.len())
        })
    }

    fn sort_sheet(&self, sheet: &str, column: usize) -> Result<()> {
        let tz = self.time_zone()?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let meta = sheet_meta(&tx, sheet)?;
            let mut rows = load_rows(&tx, sheet)?;
            let (start, _) = data_bounds(&rows, &meta);
            rows[start..].sort_by(|a, b| compare_cells(cell_at(a, column), cell_at(b, column), tz));
            write_rows(&tx, sheet, &rows)?;
            tx.commit()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn compare_orders_dates_then_text_then_blanks() {
        let mut cells = vec![
            Cell::Empty,
            text("zebra"),
            text("2024-05-02"),
            text("apple"),
            text("05/01/2024"),
        ];
        cells.sort_by(|a, b| compare_cells(a, b, UTC));
        assert_eq!(
            cells,
            vec![
                text("05/01/2024"),
                text("2024-05-02"),
                text("apple"),
                text("zebra"),
                Cell::Empty,
            ]
        );
    }

    #[test]
    fn append_grows_capacity_only_when_full() {
        let mut rows = vec![vec![text("h")], vec![text("a")]];
        let mut meta = SheetMeta {
            frozen_rows: 1,
            max_rows: 3,
        };
        assert_eq!(append_in_memory(&mut rows, &mut meta, vec![text("b")]), 3);
        assert_eq!(meta.max_rows, 3);
        assert_eq!(append_in_memory(&mut rows, &mut meta, vec![text("c")]), 4);
        assert_eq!(meta.max_rows, 4);
    }

    #[test]
    fn append_reuses_trailing_blank_rows() {
        let mut rows = vec![vec![text("h")], vec![Cell::Empty]];
        let mut meta = SheetMeta {
            frozen_rows: 1,
            max_rows: 10,
        };
        assert_eq!(append_in_memory(&mut rows, &mut meta, vec![text("a")]), 2);
        assert_eq!(rows.len(), 2);
    }
}
