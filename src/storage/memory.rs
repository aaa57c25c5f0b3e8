//! In-memory storage backend.
//!
//! Thread-safe map-backed implementation of [`RuleStore`], intended for
//! tests and embedded usage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::rule::AlertRule;
use crate::storage::traits::{RuleStore, StorageError};

/// Map-backed [`RuleStore`].
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    collections: RwLock<HashMap<String, Vec<AlertRule>>>,
}

impl InMemoryRuleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn load(&self, key: &str) -> Result<Option<Vec<AlertRule>>, StorageError> {
        Ok(self.collections.read().get(key).cloned())
    }

    fn save(&self, key: &str, rules: &[AlertRule]) -> Result<(), StorageError> {
        self.collections
            .write()
            .insert(key.to_string(), rules.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{AlertCondition, AlertRule};
    use crate::token::TokenId;

    fn sample_rule(token: &str) -> AlertRule {
        AlertRule::new(
            TokenId::new(token),
            token.to_uppercase(),
            10.0,
            AlertCondition::Above,
            9.0,
        )
    }

    #[test]
    fn absent_key_loads_as_none() {
        let store = InMemoryRuleStore::new();
        assert!(store.load("priceAlerts").unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = InMemoryRuleStore::new();
        let rules = vec![sample_rule("solana"), sample_rule("bitcoin")];

        store.save("priceAlerts", &rules).unwrap();
        assert_eq!(store.load("priceAlerts").unwrap().unwrap(), rules);
    }

    #[test]
    fn save_overwrites_the_whole_collection() {
        let store = InMemoryRuleStore::new();
        store
            .save("priceAlerts", &[sample_rule("a"), sample_rule("b")])
            .unwrap();
        store.save("priceAlerts", &[sample_rule("c")]).unwrap();

        let loaded = store.load("priceAlerts").unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].token_id, TokenId::new("c"));
    }
}
