//! Alert rule engine: rule lifecycle and tick evaluation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::{FeedError, FeedResult, ValidationError};
use crate::notify::{NotificationCapability, PermissionState};
use crate::rule::{AlertCondition, AlertRule, RuleId};
use crate::storage::{RuleStore, RULES_KEY};
use crate::token::TokenId;

/// Owns the alert-rule collection and evaluates price ticks against it.
///
/// Rules are restored from the [`RuleStore`] at construction, and the whole
/// collection is rewritten on every mutation. A rule fires at most once:
/// the in-memory `triggered` flag is authoritative for suppressing
/// re-notification, so a failed best-effort write after a trigger cannot
/// cause a duplicate within the process. It can after a restart: a lost
/// trigger write replays from the stale persisted state. That window is
/// accepted and logged, not papered over.
pub struct AlertEngine {
    rules: RwLock<Vec<AlertRule>>,
    store: Arc<dyn RuleStore>,
    notifier: Arc<dyn NotificationCapability>,
}

impl AlertEngine {
    /// Restore the persisted rule collection and wire up the collaborators.
    ///
    /// # Errors
    /// Returns [`FeedError::Storage`] if the persisted collection cannot be
    /// read.
    pub fn new(
        store: Arc<dyn RuleStore>,
        notifier: Arc<dyn NotificationCapability>,
    ) -> FeedResult<Self> {
        let rules = store.load(RULES_KEY)?.unwrap_or_default();
        Ok(Self {
            rules: RwLock::new(rules),
            store,
            notifier,
        })
    }

    /// Create a threshold rule for a token.
    ///
    /// `current_price` is the market price at creation time; it is stored
    /// with the rule and later replaced by the price that triggers it. The
    /// collection is persisted before this returns.
    ///
    /// # Errors
    /// - [`FeedError::Validation`] if the target price is not a finite
    ///   positive number, or the token id or symbol is blank. No state is
    ///   mutated.
    /// - [`FeedError::PermissionDenied`] if notification permission is not
    ///   granted and requesting it does not resolve to a grant. No rule is
    ///   created.
    /// - [`FeedError::Storage`] if the collection cannot be persisted; the
    ///   in-memory insertion is rolled back.
    pub fn add_rule(
        &self,
        token_id: TokenId,
        token_symbol: impl Into<String>,
        target_price: f64,
        condition: AlertCondition,
        current_price: f64,
    ) -> FeedResult<RuleId> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(ValidationError::NonPositiveTargetPrice {
                value: target_price,
            }
            .into());
        }
        if token_id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyTokenId.into());
        }
        let token_symbol = token_symbol.into();
        if token_symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol.into());
        }

        // Resolve the permission gate before touching any state; the
        // request may block on user interaction.
        match self.notifier.permission_state() {
            PermissionState::Granted => {}
            PermissionState::Denied => return Err(FeedError::PermissionDenied),
            PermissionState::Default => {
                if self.notifier.request_permission() != PermissionState::Granted {
                    return Err(FeedError::PermissionDenied);
                }
            }
        }

        let rule = AlertRule::new(token_id, token_symbol, target_price, condition, current_price);
        let id = rule.id;

        let mut rules = self.rules.write();
        rules.push(rule);
        if let Err(e) = self.store.save(RULES_KEY, &rules) {
            rules.pop();
            return Err(e.into());
        }
        Ok(id)
    }

    /// Delete a rule, triggered or not. Idempotent.
    ///
    /// The shrunken collection is persisted best-effort: a failed write is
    /// logged and the in-memory removal stands.
    pub fn remove_rule(&self, id: RuleId) {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|rule| rule.id != id);
        if rules.len() == before {
            return;
        }
        if let Err(e) = self.store.save(RULES_KEY, &rules) {
            warn!(rule_id = %id, "failed to persist rule removal: {e}");
        }
    }

    /// Evaluate a price observation against every active rule for the
    /// token, in creation order.
    ///
    /// Fired rules flip to `triggered`, record the observed price, and emit
    /// one notification each, with the rule id as de-duplication tag.
    /// Returns the ids that fired. The post-trigger persistence write is
    /// best-effort.
    pub fn evaluate(&self, token_id: &TokenId, current_price: f64) -> Vec<RuleId> {
        let mut fired = Vec::new();
        let mut pending = Vec::new();

        {
            let mut rules = self.rules.write();
            for rule in rules.iter_mut() {
                if rule.token_id != *token_id || !rule.is_active() {
                    continue;
                }
                if rule.condition.crossed(current_price, rule.target_price) {
                    rule.trigger(current_price);
                    fired.push(rule.id);
                    pending.push((rule.id, rule.token_symbol.clone(), rule.condition, rule.target_price));
                }
            }

            if fired.is_empty() {
                return fired;
            }
            if let Err(e) = self.store.save(RULES_KEY, &rules) {
                warn!("failed to persist triggered rules: {e}");
            }
        }

        for (id, symbol, condition, target) in pending {
            self.notifier.send(
                &format!("Price Alert: {symbol}"),
                &format!(
                    "{symbol} is now {condition} ${target:.6}.\nCurrent price: ${current_price:.6}"
                ),
                &id.to_string(),
            );
        }

        fired
    }

    /// Active rules for a token, in creation order.
    #[must_use]
    pub fn rules_for_token(&self, token_id: &TokenId) -> Vec<AlertRule> {
        self.rules
            .read()
            .iter()
            .filter(|rule| rule.token_id == *token_id && rule.is_active())
            .cloned()
            .collect()
    }

    /// All active rules, in creation order.
    #[must_use]
    pub fn active_rules(&self) -> Vec<AlertRule> {
        self.rules
            .read()
            .iter()
            .filter(|rule| rule.is_active())
            .cloned()
            .collect()
    }

    /// The whole collection, triggered history included, in creation order.
    #[must_use]
    pub fn all_rules(&self) -> Vec<AlertRule> {
        self.rules.read().clone()
    }
}
