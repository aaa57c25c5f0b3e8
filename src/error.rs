//! Error types for tickfeed.
//!
//! All errors are strongly typed using thiserror. This enables pattern
//! matching on specific failure conditions and provides clear error
//! messages.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised before any state is mutated.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("target price must be a finite positive number (got {value})")]
    NonPositiveTargetPrice {
        value: f64,
    },

    #[error("token id cannot be empty")]
    EmptyTokenId,

    #[error("token symbol cannot be empty")]
    EmptySymbol,
}

/// Top-level error type for feed and alert operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification permission is not granted and could not be obtained.
    #[error("notification permission denied")]
    PermissionDenied,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The feed worker has shut down and can no longer service requests.
    #[error("feed worker disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FeedError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a permission failure.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the feed worker was gone when the operation ran.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Returns true if this error is retryable.
    ///
    /// Validation and permission failures will not change on retry; storage
    /// failures might.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::PermissionDenied | Self::Disconnected { .. } | Self::Internal { .. } => false,
            Self::Storage(_) | Self::Timeout { .. } => true,
        }
    }
}

/// Result type alias for tickfeed operations.
pub type FeedResult<T> = Result<T, FeedError>;
