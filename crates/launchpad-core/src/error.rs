//! Error types for the Launchpad application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Launchpad application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum LaunchpadError {
    /// Required startup input is missing (e.g. empty idea text)
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Storage backend error (key-value store, repositories)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis service error that escaped per-step handling
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LaunchpadError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MissingInput error
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a MissingInput error
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a storage or IO error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LaunchpadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LaunchpadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LaunchpadError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LaunchpadError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the binary boundary)
impl From<anyhow::Error> for LaunchpadError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, LaunchpadError>`.
pub type Result<T> = std::result::Result<T, LaunchpadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_display() {
        let err = LaunchpadError::missing_input("idea text is required");
        assert!(err.is_missing_input());
        assert_eq!(err.to_string(), "Missing input: idea text is required");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LaunchpadError = parse_err.into();
        assert!(err.is_serialization());
        match err {
            LaunchpadError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_counts_as_storage() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LaunchpadError = io_err.into();
        assert!(err.is_storage());
        assert!(err.to_string().contains("PermissionDenied"));
    }
}
