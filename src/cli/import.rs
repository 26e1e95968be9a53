//! Import subcommand: restore sheets from a JSON snapshot.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the snapshot file (plain or gzipped JSON)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Validate the snapshot and report what would be imported without
    /// changing the database
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Describe the import mode for logging
    pub fn import_mode(&self) -> &'static str {
        if self.dry_run { "dry-run" } else { "replace" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_mode() {
        let args = ImportArgs {
            file: PathBuf::from("test.json"),
            dry_run: true,
        };
        assert_eq!(args.import_mode(), "dry-run");

        let args = ImportArgs {
            file: PathBuf::from("test.json"),
            dry_run: false,
        };
        assert_eq!(args.import_mode(), "replace");
    }
}
