//! Subscription registry: live tokens and their latest prices.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::price::PriceUpdate;
use crate::token::TokenId;

/// A live price-tracking registration for a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// Token being tracked.
    pub token_id: TokenId,
    /// Display symbol.
    pub symbol: String,
    /// Last price observed for the token.
    pub last_price: f64,
}

#[derive(Debug)]
struct TokenEntry {
    live: bool,
    update: PriceUpdate,
}

/// Tracks which tokens are live and the last [`PriceUpdate`] seen for each.
///
/// Holds at most one entry per token. Unsubscribing marks the entry dormant
/// (ticks stop) but keeps the last observed price available to readers;
/// [`clear`](Self::clear) discards it entirely.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: RwLock<HashMap<TokenId, TokenEntry>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking a token.
    ///
    /// Idempotent: a token that already has an entry keeps its current
    /// price (a dormant entry is merely reactivated). A fresh entry starts
    /// at `initial_price` with zeroed change and volume.
    pub fn subscribe(&self, token_id: TokenId, symbol: impl Into<String>, initial_price: f64) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(&token_id) {
            entry.live = true;
            return;
        }

        let update = PriceUpdate {
            token_id: token_id.clone(),
            symbol: symbol.into(),
            price: initial_price,
            change_24h: 0.0,
            volume_24h: 0.0,
            timestamp: Utc::now(),
        };
        entries.insert(token_id, TokenEntry { live: true, update });
    }

    /// Stop tracking a token. Idempotent.
    ///
    /// The last observed price stays readable via [`latest`](Self::latest)
    /// until explicitly cleared.
    pub fn unsubscribe(&self, token_id: &TokenId) {
        if let Some(entry) = self.entries.write().get_mut(token_id) {
            entry.live = false;
        }
    }

    /// Discard a retained entry entirely.
    pub fn clear(&self, token_id: &TokenId) {
        self.entries.write().remove(token_id);
    }

    /// Last observed update for a token, live or dormant. Non-blocking.
    #[must_use]
    pub fn latest(&self, token_id: &TokenId) -> Option<PriceUpdate> {
        self.entries.read().get(token_id).map(|e| e.update.clone())
    }

    /// Whether the token currently receives ticks.
    #[must_use]
    pub fn is_live(&self, token_id: &TokenId) -> bool {
        self.entries
            .read()
            .get(token_id)
            .is_some_and(|e| e.live)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.read().values().filter(|e| e.live).count()
    }

    /// Snapshot of the live subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.entries
            .read()
            .values()
            .filter(|e| e.live)
            .map(|e| Subscription {
                token_id: e.update.token_id.clone(),
                symbol: e.update.symbol.clone(),
                last_price: e.update.price,
            })
            .collect()
    }

    /// Snapshot of the latest updates for every live token, taken once per
    /// tick pass.
    pub(crate) fn live_snapshot(&self) -> Vec<PriceUpdate> {
        self.entries
            .read()
            .values()
            .filter(|e| e.live)
            .map(|e| e.update.clone())
            .collect()
    }

    /// Record a fresh update for a token. Dropped if the entry was cleared
    /// in the meantime.
    pub(crate) fn record(&self, update: PriceUpdate) {
        if let Some(entry) = self.entries.write().get_mut(&update.token_id) {
            entry.update = update;
        }
    }
}
