//! Error types for Cairn.

use crate::operation::OperationKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Cairn workspace.
///
/// Variants are split by blast radius: validation and precondition failures
/// are raised before any I/O happens, gateway and transport failures come back
/// from the persistence backend, and the remaining variants cover local
/// configuration and storage.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CairnError {
    /// Malformed checkpoint input (name, priority, tags, description)
    #[error("{0}")]
    Validation(String),

    /// An operation needed a current session and workspace state
    #[error("No active session or workspace state")]
    NoActiveSession,

    /// The backend answered with a non-success status
    #[error("{message}")]
    Gateway { status: u16, message: String },

    /// The backend could not be reached (connect, timeout, broken body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Another call of the same kind is still running
    #[error("Operation already in progress: {0}")]
    OperationInProgress(OperationKind),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CairnError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Gateway error
    pub fn gateway(status: u16, message: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Gateway or Transport error, i.e. the backend failed
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Gateway { .. } | Self::Transport(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error was raised by the single-flight guard
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::OperationInProgress(_))
    }

    /// Check if the backend reported the entity as missing (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Gateway { status: 404, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CairnError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CairnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CairnError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CairnError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CairnError>`.
pub type Result<T> = std::result::Result<T, CairnError>;
