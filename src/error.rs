//! Custom error types for SafeBridge.
//!
//! Scoring itself never fails: estimators absorb missing evidence as an
//! insufficient-data sub-score. The errors here cover the layers around the
//! scorer (configuration, requests, and the storage and notification
//! collaborators).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SafeBridge operations
#[derive(Error, Debug)]
pub enum SafeBridgeError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Risk weights rejected by validation
    #[error("Invalid risk weights: {reason}")]
    InvalidWeights { reason: String },

    // =========================================================================
    // Request Errors
    // =========================================================================
    /// Request or reported evidence could not be used
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Prediction or evidence store failed
    #[error("Store operation '{operation}' failed: {message}")]
    Store { operation: String, message: String },

    /// Notification dispatch failed
    #[error("Notification dispatch to {recipient} failed: {message}")]
    Notification { recipient: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SafeBridgeError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration error for a single field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Create a store error
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a notification error
    pub fn notification(recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            recipient: recipient.into(),
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error comes from configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidConfig { .. } | Self::InvalidWeights { .. }
        )
    }

    /// Check if this error was raised by an external collaborator
    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Notification { .. })
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequest { .. } => 2,
            Self::Store { .. } | Self::Notification { .. } => 3,
            Self::Config { .. } | Self::InvalidConfig { .. } | Self::InvalidWeights { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for SafeBridge results
pub type Result<T> = std::result::Result<T, SafeBridgeError>;

/// Extension trait for converting foreign errors to SafeBridgeError
pub trait IntoSafeBridgeError<T> {
    fn into_store_error(self, operation: &str) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoSafeBridgeError<T> for std::result::Result<T, E> {
    fn into_store_error(self, operation: &str) -> Result<T> {
        self.map_err(|e| SafeBridgeError::store(operation, e.into().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SafeBridgeError::invalid_config("alerts.minLevel", "must be between 1 and 5");
        assert!(err.to_string().contains("alerts.minLevel"));
        assert!(err.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn test_is_config_error() {
        assert!(SafeBridgeError::config("bad").is_config_error());
        assert!(SafeBridgeError::InvalidWeights {
            reason: "all zero".into()
        }
        .is_config_error());
        assert!(!SafeBridgeError::store("save", "disk full").is_config_error());
    }

    #[test]
    fn test_is_collaborator_error() {
        assert!(SafeBridgeError::store("save", "disk full").is_collaborator_error());
        assert!(SafeBridgeError::notification("worker-1", "queue closed").is_collaborator_error());
        assert!(!SafeBridgeError::invalid_request("no user").is_collaborator_error());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(SafeBridgeError::invalid_request("x").exit_code(), 2);
        assert_eq!(SafeBridgeError::store("save", "x").exit_code(), 3);
        assert_eq!(SafeBridgeError::config("x").exit_code(), 7);
        assert_eq!(SafeBridgeError::invalid_config("a", "b").exit_code(), 7);
        let io_err = std::io::Error::other("boom");
        assert_eq!(SafeBridgeError::from(io_err).exit_code(), 1);
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/srv/.safebridge/settings.json");
        let err = SafeBridgeError::config_with_path("failed to parse", path.clone());
        if let SafeBridgeError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_into_store_error_trait() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        ));

        match result.into_store_error("append prediction") {
            Err(SafeBridgeError::Store { operation, message }) => {
                assert_eq!(operation, "append prediction");
                assert!(message.contains("read-only filesystem"));
            }
            other => panic!("Wrong error variant after conversion: {other:?}"),
        }
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SafeBridgeError = json_err.into();
        assert!(matches!(err, SafeBridgeError::Json(_)));
    }
}
