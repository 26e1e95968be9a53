//! Error types for sheet, settings and mail failures.
//!
//! Operations propagate everything through `anyhow::Result`; these variants
//! exist for the failures callers and tests want to match on.

/// Domain errors raised by the store, the settings sheet and the mailers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A sheet the operation needs does not exist in the store.
    #[error("sheet not found: {name}")]
    SheetNotFound { name: String },

    /// A required key is absent from the Config sheet.
    #[error("missing setting: {key}")]
    MissingSetting { key: String },

    /// A Config sheet value could not be interpreted.
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The configured time zone is not a known IANA zone.
    #[error("invalid time zone: {name}")]
    InvalidTimeZone { name: String },

    /// A trigger names an operation this build does not know.
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    /// A data row index outside the sheet's data range.
    #[error("row {index} is out of range for sheet {sheet} ({rows} data rows)")]
    RowOutOfRange {
        sheet: String,
        index: usize,
        rows: usize,
    },

    /// The mail transport refused or failed to deliver a message.
    #[error("mail delivery to {recipient} failed: {reason}")]
    MailDelivery { recipient: String, reason: String },
}

impl Error {
    pub fn sheet_not_found(name: &str) -> Self {
        Self::SheetNotFound {
            name: name.to_string(),
        }
    }

    pub fn missing_setting(key: &str) -> Self {
        Self::MissingSetting {
            key: key.to_string(),
        }
    }

    pub fn invalid_setting(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn mail_delivery(recipient: &str, reason: impl std::fmt::Display) -> Self {
        Self::MailDelivery {
            recipient: recipient.to_string(),
            reason: reason.to_string(),
        }
    }
}
