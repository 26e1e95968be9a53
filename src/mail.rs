//! Mail transports.
//!
//! Reminders go through the [`Mailer`] trait: one synchronous `send` per
//! message, no batching. A failed send aborts the reminder run.

use crate::config::{MailConfig, MailTransport};
use crate::db::Database;
use crate::error::Error;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// A plain-text message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outgoing mail transport.
pub trait Mailer {
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Stores messages in the database outbox instead of delivering them.
pub struct OutboxMailer {
    db: Database,
}

impl OutboxMailer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        let id = self.db.queue_message(message)?;
        debug!(id, to = %message.to, "Queued message in outbox");
        Ok(())
    }
}

/// Pipes messages to a sendmail-compatible program (`sendmail -t -i`).
pub struct SendmailMailer {
    program: String,
    from: Option<String>,
}

impl SendmailMailer {
    pub fn new(program: impl Into<String>, from: Option<String>) -> Self {
        Self {
            program: program.into(),
            from,
        }
    }

    /// Render the message as RFC 5322 text. Header values containing a line
    /// break are rejected.
    pub fn render(&self, message: &MailMessage) -> Result<String, Error> {
        let mut out = String::new();
        if let Some(ref from) = self.from {
            push_header(&mut out, "From", from, &message.to)?;
        }
        push_header(&mut out, "To", &message.to, &message.to)?;
        push_header(&mut out, "Subject", &message.subject, &message.to)?;
        out.push_str("MIME-Version: 1.0\n");
        out.push_str("Content-Type: text/plain; charset=utf-8\n\n");
        out.push_str(&message.body);
        Ok(out)
    }
}

fn push_header(out: &mut String, name: &str, value: &str, recipient: &str) -> Result<(), Error> {
    if value.contains(['\r', '\n']) {
        return Err(Error::mail_delivery(
            recipient.trim(),
            format!("{} header contains a line break", name),
        ));
    }
    out.push_str(&format!("{}: {}\n", name, value));
    Ok(())
}

impl Mailer for SendmailMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        let text = self.render(message)?;
        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::mail_delivery(&message.to, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| Error::mail_delivery(&message.to, e))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::mail_delivery(&message.to, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::mail_delivery(
                &message.to,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            )
            .into());
        }
        debug!(to = %message.to, "Delivered message via sendmail");
        Ok(())
    }
}

/// Build the transport selected in the configuration.
pub fn from_config(config: &MailConfig, db: &Database) -> Box<dyn Mailer> {
    match config.transport {
        MailTransport::Outbox => Box::new(OutboxMailer::new(db.clone())),
        MailTransport::Sendmail => Box::new(SendmailMailer::new(
            config.sendmail_path.clone(),
            config.from.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_headers_and_body() {
        let mailer = SendmailMailer::new("sendmail", Some("tasks@x.com".to_string()));
        let text = mailer.render(&MailMessage {
            to: "a@x.com".to_string(),
            subject: "Hello".to_string(),
            body: "Line one\n".to_string(),
        })
        .unwrap();
        assert!(text.starts_with("From: tasks@x.com\nTo: a@x.com\nSubject: Hello\n"));
        assert!(text.ends_with("\n\nLine one\n"));
    }

    #[test]
    fn line_breaks_in_headers_are_rejected() {
        let mailer = SendmailMailer::new("sendmail", None);
        for (to, subject) in [
            ("a@x.com\nBcc: evil@attacker.example", "Hello"),
            ("a@x.com", "Hello\r\nBcc: evil@attacker.example"),
        ] {
            let err = mailer
                .render(&MailMessage {
                    to: to.to_string(),
                    subject: subject.to_string(),
                    body: "b".to_string(),
                })
                .unwrap_err();
            assert!(matches!(err, Error::MailDelivery { .. }));
        }

        let err = mailer
            .send(&MailMessage {
                to: "a@x.com\nBcc: evil@attacker.example".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MailDelivery { .. })
        ));
    }

    #[test]
    fn outbox_mailer_records_messages() {
        let db = Database::open_in_memory().unwrap();
        let mailer = OutboxMailer::new(db.clone());
        mailer
            .send(&MailMessage {
                to: "a@x.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .unwrap();

        let messages = db.outbox_messages(None).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient, "a@x.com");
    }

    #[test]
    fn missing_program_is_a_delivery_error() {
        let mailer = SendmailMailer::new("/nonexistent/sendmail", None);
        let err = mailer
            .send(&MailMessage {
                to: "a@x.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MailDelivery { .. })
        ));
    }
}
