//! Configuration types and structures.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default link template for the shared sheet view.
pub const DEFAULT_SHEET_LINK: &str = "https://docs.google.com/spreadsheet/ccc?key={sheet_id}#gid=0";

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Sheet store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// IANA time zone written to new stores by `init`.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Link placed in reminders; `{sheet_id}` is replaced by the store id.
    #[serde(default = "default_sheet_link")]
    pub sheet_link: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            time_zone: default_time_zone(),
            sheet_link: default_sheet_link(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("daily-tasks/tasks.db")
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_sheet_link() -> String {
    DEFAULT_SHEET_LINK.to_string()
}

/// How reminder mail leaves the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTransport {
    /// Store messages in the database outbox (default).
    #[default]
    Outbox,
    /// Pipe messages to a sendmail-compatible program.
    Sendmail,
}

/// Mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub transport: MailTransport,

    /// Envelope sender; left to the transport when unset.
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::default(),
            from: None,
            sendmail_path: default_sendmail_path(),
        }
    }
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

/// Trigger daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between trigger checks.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

fn default_tick_seconds() -> u64 {
    60
}

impl Config {
    /// Load configuration from a single YAML file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.store.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Validate values that serde cannot check.
    pub fn validate(&self) -> Result<()> {
        crate::dates::parse_time_zone(&self.store.time_zone)?;
        if self.daemon.tick_seconds == 0 {
            anyhow::bail!("daemon.tick_seconds must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
mail:
  transport: sendmail
  from: tasks@example.com
"#,
        )
        .unwrap();
        assert_eq!(config.mail.transport, MailTransport::Sendmail);
        assert_eq!(config.mail.from.as_deref(), Some("tasks@example.com"));
        assert_eq!(config.mail.sendmail_path, "/usr/sbin/sendmail");
        assert_eq!(config.store.time_zone, "UTC");
        assert_eq!(config.daemon.tick_seconds, 60);
    }

    #[test]
    fn validate_rejects_unknown_zone_and_zero_tick() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.store.time_zone = "Nowhere/Land".to_string();
        assert!(config.validate().is_err());

        config.store.time_zone = "Europe/Berlin".to_string();
        config.daemon.tick_seconds = 0;
        assert!(config.validate().is_err());
    }
}
