//! Unified error handling for liftmap.
//!
//! Every fallible operation in the crate returns [`TrackerError`]. The three
//! variants mirror where a user-triggered action can go wrong: bad input,
//! the remote planner, or the local database. None of them are fatal; the
//! caller turns them into a short message with [`TrackerError::user_message`].

use thiserror::Error;

/// Unified error type for liftmap operations.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// Empty or missing required user input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Generation endpoint unreachable, timed out, or returned an error status
    #[error("{}", format_remote(message, *status_code))]
    RemoteService {
        message: String,
        status_code: Option<u16>,
    },

    /// Local persistence unavailable or write rejected
    #[error("Storage error: {message}")]
    Storage { message: String },
}

fn format_remote(message: &str, status_code: Option<u16>) -> String {
    match status_code {
        Some(code) => format!("Remote service error ({}): {}", code, message),
        None => format!("Remote service error: {}", message),
    }
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        TrackerError::Storage {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>, status_code: Option<u16>) -> Self {
        TrackerError::RemoteService {
            message: message.into(),
            status_code,
        }
    }

    /// Short human-readable message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Validation { message } => message.clone(),
            TrackerError::RemoteService { .. } => {
                "Failed to generate a workout. Please try again.".to_string()
            }
            TrackerError::Storage { .. } => {
                "Could not access your workout history. Please try again.".to_string()
            }
        }
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(e: rusqlite::Error) -> Self {
        TrackerError::storage(e.to_string())
    }
}

impl From<rusqlite_migration::Error> for TrackerError {
    fn from(e: rusqlite_migration::Error) -> Self {
        TrackerError::storage(format!("schema migration failed: {}", e))
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::storage(format!("corrupt record: {}", e))
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        let status_code = e.status().map(|s| s.as_u16());
        let message = if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        };
        TrackerError::RemoteService {
            message,
            status_code,
        }
    }
}

/// Result type alias for liftmap operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Extension trait for converting Option to TrackerError.
pub trait OptionExt<T> {
    /// Convert a missing record into a storage error naming the collection and id.
    fn ok_or_missing(self, collection: &str, id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing(self, collection: &str, id: &str) -> Result<T> {
        self.ok_or_else(|| TrackerError::Storage {
            message: format!("no {} record with id '{}'", collection, id),
        })
    }
}
