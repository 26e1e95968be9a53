//! Outbox of messages recorded by the outbox mail transport.

use super::{Database, now_ms};
use crate::mail::MailMessage;
use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

/// A message stored in the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub queued_at: i64,
}

impl Database {
    /// Store a message. Returns its outbox id.
    pub fn queue_message(&self, message: &MailMessage) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO outbox (recipient, subject, body, queued_at) VALUES (?1, ?2, ?3, ?4)",
                params![message.to, message.subject, message.body, now_ms()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Stored messages, oldest first, optionally only the most recent `limit`.
    pub fn outbox_messages(&self, limit: Option<usize>) -> Result<Vec<OutboxMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recipient, subject, body, queued_at FROM (
                    SELECT * FROM outbox ORDER BY id DESC LIMIT ?1
                 ) ORDER BY id",
            )?;
            let limit = limit.map_or(-1, |l| l as i64);
            let messages = stmt
                .query_map(params![limit], |row| {
                    Ok(OutboxMessage {
                        id: row.get(0)?,
                        recipient: row.get(1)?,
                        subject: row.get(2)?,
                        body: row.get(3)?,
                        queued_at: row.get(4)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(messages)
        })
    }

    /// Delete every stored message. Returns how many were removed.
    pub fn clear_outbox(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM outbox", [])?))
    }
}
