//! Alert rules and their state machine.
//!
//! A rule is a user-defined threshold condition on a token, tracked through
//! a two-state machine: `Active --[condition crossed]--> Triggered`. The
//! triggered state is terminal for notification purposes; the rule remains
//! queryable as a historical record until explicitly removed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::TokenId;

/// Unique identifier for an alert rule.
///
/// Doubles as the de-duplication tag handed to the notification capability,
/// so a sink that suppresses repeated tags cannot double-deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(Uuid);

impl RuleId {
    /// Create a new random rule id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which side of the target price fires a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    /// Fire when the price reaches or exceeds the target.
    Above,
    /// Fire when the price reaches or falls below the target.
    Below,
}

impl AlertCondition {
    /// Whether `price` satisfies this condition against `target`.
    ///
    /// Equality counts as a crossing for both sides.
    #[must_use]
    pub fn crossed(self, price: f64, target: f64) -> bool {
        match self {
            Self::Above => price >= target,
            Self::Below => price <= target,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => f.write_str("above"),
            Self::Below => f.write_str("below"),
        }
    }
}

/// A user-defined price-threshold rule.
///
/// The only mutation permitted after creation is the one-way
/// `triggered: false -> true` transition performed by [`trigger`]; the
/// token association, condition, and target are immutable for the rule's
/// lifetime.
///
/// [`trigger`]: AlertRule::trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Rule identity.
    pub id: RuleId,

    /// Token the rule watches.
    pub token_id: TokenId,

    /// Display symbol used in notification messages.
    pub token_symbol: String,

    /// The threshold. Strictly positive and finite.
    pub target_price: f64,

    /// Side of the threshold that fires the rule.
    pub condition: AlertCondition,

    /// Price observed when the rule was created; snapshotted to the
    /// triggering price when the rule fires.
    pub current_price: f64,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Whether the rule has fired. Monotonic: never reset.
    pub triggered: bool,
}

impl AlertRule {
    pub(crate) fn new(
        token_id: TokenId,
        token_symbol: String,
        target_price: f64,
        condition: AlertCondition,
        current_price: f64,
    ) -> Self {
        Self {
            id: RuleId::new(),
            token_id,
            token_symbol,
            target_price,
            condition,
            current_price,
            created_at: Utc::now(),
            triggered: false,
        }
    }

    /// Whether the rule is still armed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.triggered
    }

    /// Fire the rule: record the observed price and freeze the state.
    pub(crate) fn trigger(&mut self, observed_price: f64) {
        self.triggered = true;
        self.current_price = observed_price;
    }
}
