//! Daily triggers and store properties.

use super::{Database, now_ms};
use crate::store::{Operation, Trigger, TriggerRegistry};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

fn parse_trigger_row(row: &Row) -> rusqlite::Result<(i64, String, i64, Option<String>, i64)> {
    Ok((
        row.get("id")?,
        row.get("operation")?,
        row.get("hour")?,
        row.get("last_fired")?,
        row.get("created_at")?,
    ))
}

impl TriggerRegistry for Database {
    fn list_triggers(&self) -> Result<Vec<Trigger>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, operation, hour, last_fired, created_at
                 FROM triggers ORDER BY hour, id",
            )?;
            let raw = stmt
                .query_map([], parse_trigger_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            raw.into_iter()
                .map(|(id, operation, hour, last_fired, created_at)| {
                    Ok(Trigger {
                        id,
                        operation: operation.parse::<Operation>()?,
                        hour: hour as u8,
                        last_fired,
                        created_at,
                    })
                })
                .collect()
        })
    }

    fn delete_trigger(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM triggers WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    fn create_daily_trigger(&self, operation: Operation, hour: u8) -> Result<Trigger> {
        self.with_conn(|conn| {
            let created_at = now_ms();
            conn.execute(
                "INSERT INTO triggers (operation, hour, created_at) VALUES (?1, ?2, ?3)",
                params![operation.as_str(), hour as i64, created_at],
            )?;
            Ok(Trigger {
                id: conn.last_insert_rowid(),
                operation,
                hour,
                last_fired: None,
                created_at,
            })
        })
    }

    fn replace_triggers(&self, schedule: &[(Operation, u8)]) -> Result<Vec<Trigger>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM triggers", [])?;
            let created_at = now_ms();
            let mut created = Vec::with_capacity(schedule.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO triggers (operation, hour, created_at) VALUES (?1, ?2, ?3)",
                )?;
                for &(operation, hour) in schedule {
                    stmt.execute(params![operation.as_str(), hour as i64, created_at])?;
                    created.push(Trigger {
                        id: tx.last_insert_rowid(),
                        operation,
                        hour,
                        last_fired: None,
                        created_at,
                    });
                }
            }
            tx.commit()?;
            debug!(removed, created = created.len(), "Replaced triggers");
            Ok(created)
        })
    }

    fn mark_fired(&self, id: i64, day: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE triggers SET last_fired = ?1 WHERE id = ?2",
                params![day, id],
            )?;
            Ok(())
        })
    }

    fn property(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM properties WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO properties (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }
}
