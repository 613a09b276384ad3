//! Unified error type for `ShopFloor`.
//!
//! Variants are grouped by how an interaction treats them: lookup misses are
//! reported back as warnings, transport and database failures abort the current
//! command, and configuration errors halt startup.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (halts startup)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// The backing store rejected or could not run a statement
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A submitted field failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// Description of the rejected field
        message: String,
    },

    /// A date that does not follow `DD/MM/YYYY`
    #[error("Malformed date '{value}': expected DD/MM/YYYY")]
    MalformedDate {
        /// The offending text
        value: String,
    },

    /// A stored row that cannot be decoded into a record
    #[error("Row {row} of sheet '{sheet}' is malformed: {message}")]
    MalformedRow {
        /// Sheet name
        sheet: &'static str,
        /// 1-based row index
        row: u32,
        /// What went wrong
        message: String,
    },

    /// No record matched the identity key of an edit
    #[error("No {entity} found for {key}")]
    LookupMiss {
        /// Kind of record that was searched for
        entity: &'static str,
        /// Human-readable identity key
        key: String,
    },

    /// The row an append would land on already holds data
    #[error("Row {row} of sheet '{sheet}' is already occupied; append refused")]
    AppendConflict {
        /// Sheet name
        sheet: &'static str,
        /// 1-based row index
        row: u32,
    },

    /// Attempt to close a work order that is not open
    #[error("Work order {code} is not open")]
    OrderNotOpen {
        /// Work order code
        code: u32,
    },

    /// A remote store could not be reached or answered with an error status
    #[error("Remote store unavailable: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },

    /// Image bytes that could not be decoded
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// PDF generation failure
    #[error("Render error: {message}")]
    Render {
        /// Description of the failure
        message: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Discord framework error
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),

    /// String formatting error
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Integer conversion error
    #[error("Number out of range: {0}")]
    OutOfRange(#[from] std::num::TryFromIntError),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(value: lopdf::Error) -> Self {
        Self::Render {
            message: value.to_string(),
        }
    }
}

impl Error {
    /// Whether the interaction may carry on after this error.
    ///
    /// Lookup misses and validation problems are reported as warnings; everything
    /// else aborts the current interaction.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::LookupMiss { .. }
                | Self::Validation { .. }
                | Self::MalformedDate { .. }
                | Self::OrderNotOpen { .. }
        )
    }

    /// Message shown to the person who triggered the interaction.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_warning() {
            format!("⚠️ {self}")
        } else {
            format!("❌ {self}")
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_is_warning() {
        let err = Error::LookupMiss {
            entity: "absence",
            key: "10/03/2025 / Ana".to_string(),
        };
        assert!(err.is_warning());
        assert_eq!(err.user_message(), "⚠️ No absence found for 10/03/2025 / Ana");
    }

    #[test]
    fn test_transport_is_fatal() {
        let err = Error::Transport {
            message: "connection refused".to_string(),
        };
        assert!(!err.is_warning());
        assert!(err.user_message().starts_with("❌"));
    }
}
