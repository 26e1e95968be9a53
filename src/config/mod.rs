//! Tool configuration.
//!
//! Merged field-by-field from these tiers, lowest first:
//! 1. **Defaults** - `Config::default()`
//! 2. **Project** - `$CWD/daily-tasks/config.yaml`
//! 3. **User** - `~/.daily-tasks/config.yaml`
//! 4. **Environment** - the variables below
//!
//! ## Environment Variables
//! - `DAILY_TASKS_CONFIG_PATH` - Explicit config file (skips the file tiers)
//! - `DAILY_TASKS_DB_PATH` - Database path
//! - `DAILY_TASKS_TIME_ZONE` - Time zone used by `init`

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, ConfigTier, DB_PATH_ENV, TIME_ZONE_ENV};
pub use merge::merge_tier;
pub use types::*;
