//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::merge_tier;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Explicit config file, bypasses tiering.
pub const CONFIG_PATH_ENV: &str = "DAILY_TASKS_CONFIG_PATH";
/// Database path override.
pub const DB_PATH_ENV: &str = "DAILY_TASKS_DB_PATH";
/// Time zone override.
pub const TIME_ZONE_ENV: &str = "DAILY_TASKS_TIME_ZONE";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/daily-tasks/)
    Project = 1,
    /// User-level config (~/.daily-tasks/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths: `./daily-tasks` and `~/.daily-tasks`.
    pub fn discover() -> Self {
        Self {
            project_dir: Some(PathBuf::from("daily-tasks")),
            user_dir: dirs::home_dir().map(|h| h.join(".daily-tasks")),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn config_file(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            _ => None,
        }?;
        Some(dir.join(CONFIG_FILE))
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_with(ConfigPaths::discover(), explicit.as_deref())
    }

    /// Load configuration, preferring an explicit file over the tiers.
    pub fn load_with(paths: ConfigPaths, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let mut config = Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Self::apply_env_overrides(&mut config);
            return Ok(Self {
                paths,
                config,
                sources: vec![path.to_path_buf()],
            });
        }
        Self::load_with_paths(paths)
    }

    /// Load configuration with explicit tier paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut merged: Value = serde_json::to_value(Config::default())?;
        let mut sources = Vec::new();

        for tier in [ConfigTier::Project, ConfigTier::User] {
            let Some(file) = paths.config_file(tier) else {
                continue;
            };
            if !file.exists() {
                continue;
            }
            match read_yaml(&file) {
                Ok(value) => {
                    debug!(%tier, path = %file.display(), "Loaded config tier");
                    merge_tier(&mut merged, value);
                    sources.push(file);
                }
                Err(e) => warn!(%tier, path = %file.display(), error = %e, "Ignoring unreadable config"),
            }
        }

        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            config.store.db_path = PathBuf::from(db_path);
        }

        if let Ok(time_zone) = std::env::var(TIME_ZONE_ENV) {
            config.store.time_zone = time_zone;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let value = serde_yaml::from_str::<Value>(&content)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailTransport;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert_eq!(paths.project_dir, Some(PathBuf::from("daily-tasks")));
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.daemon.tick_seconds, 60);
        assert_eq!(config.mail.transport, MailTransport::Outbox);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("daily-tasks");
        std::fs::create_dir_all(&project_dir).unwrap();

        let config_content = r#"
daemon:
  tick_seconds: 15
"#;
        std::fs::write(project_dir.join("config.yaml"), config_content).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(temp.path().join("user")));

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.daemon.tick_seconds, 15);
        assert_eq!(config.mail.sendmail_path, "/usr/sbin/sendmail");
        assert_eq!(loader.sources().len(), 1);
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("daily-tasks");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        let project_config = r#"
store:
  sheet_link: "https://sheets.example.com/{sheet_id}"
mail:
  from: team@example.com
"#;
        std::fs::write(project_dir.join("config.yaml"), project_config).unwrap();

        let user_config = r#"
mail:
  transport: sendmail
  from: me@example.com
"#;
        std::fs::write(user_dir.join("config.yaml"), user_config).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.mail.from.as_deref(), Some("me@example.com"));
        assert_eq!(config.mail.transport, MailTransport::Sendmail);
        assert_eq!(
            config.store.sheet_link,
            "https://sheets.example.com/{sheet_id}"
        );
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_explicit_file_bypasses_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("daily-tasks");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.yaml"),
            "daemon:\n  tick_seconds: 15\n",
        )
        .unwrap();

        let explicit = temp.path().join("other.yaml");
        std::fs::write(&explicit, "store:\n  sheet_link: \"file://{sheet_id}\"\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with(paths, Some(&explicit)).unwrap();
        let config = loader.config();

        assert_eq!(config.store.sheet_link, "file://{sheet_id}");
        assert_eq!(config.daemon.tick_seconds, 60);
        assert_eq!(loader.sources(), &[explicit]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, None);
        let missing = temp.path().join("missing.yaml");
        assert!(ConfigLoader::load_with(paths, Some(&missing)).is_err());
    }
}
