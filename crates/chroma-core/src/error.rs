//! Error types.
//!
//! Configuration problems are fatal at startup. Player intents never produce
//! errors; they are refused with [`crate::events::Feedback`] instead.

use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("`{field}` must have {expected} entries, found {found}")]
    TableLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("wave schedule is empty")]
    EmptySchedule,

    #[error("formation definitions, line {line}: {message}")]
    Formation { line: usize, message: String },

    #[error("invalid probability expression `{expression}`: {message}")]
    Expression { expression: String, message: String },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal simulation errors returned from `tick`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("wave {wave} is in progress but has no spawn schedule")]
    MissingSpawnSchedule { wave: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
