//! Price tick values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::TokenId;

/// A single price observation for a subscribed token.
///
/// Produced at most once per tick per live token and never mutated; the
/// next tick supersedes it with a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    /// Token the observation belongs to.
    pub token_id: TokenId,

    /// Display symbol, e.g. `"SOL"`.
    pub symbol: String,

    /// Current price. Strictly positive.
    pub price: f64,

    /// Running 24h change, in percent.
    ///
    /// Accumulated additively from per-tick deltas rather than recomputed
    /// over a true 24-hour window; the simulated feed has no real baseline
    /// to derive one from.
    pub change_24h: f64,

    /// 24h traded volume carried by the simulation. Non-negative.
    pub volume_24h: f64,

    /// When the observation was produced.
    pub timestamp: DateTime<Utc>,
}
