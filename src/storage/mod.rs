//! Durable persistence for the alert-rule collection.
//!
//! Backends implement the [`RuleStore`] trait: a key-value layer with
//! whole-collection overwrite semantics. The in-memory backend serves tests
//! and embedded use; the file backend is the durable production path.

mod traits;

pub mod file;
pub mod memory;

pub use file::FileRuleStore;
pub use memory::InMemoryRuleStore;
pub use traits::{RuleStore, StorageError, RULES_KEY};
