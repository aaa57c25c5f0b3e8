//! Abstract storage trait for alert-rule persistence.
//!
//! The trait defines the contract that storage backends must implement.
//! By using a trait, we enable:
//! - In-memory backends for testing and embedded use
//! - File-backed backends for durable deployments
//! - Remote stores without touching the engine

use thiserror::Error;

use crate::rule::AlertRule;

/// Collection key under which the alert rules are persisted.
pub const RULES_KEY: &str = "priceAlerts";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend I/O failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value persistence for the alert-rule collection.
///
/// `save` overwrites the whole collection stored under a key; there are no
/// incremental writes. Implementations must be safe to share across
/// threads.
pub trait RuleStore: Send + Sync {
    /// Load the collection stored under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<Vec<AlertRule>>, StorageError>;

    /// Overwrite the collection stored under `key`.
    fn save(&self, key: &str, rules: &[AlertRule]) -> Result<(), StorageError>;
}
