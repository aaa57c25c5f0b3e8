//! # tickfeed - live price feed with threshold alerts
//!
//! `tickfeed` is the embedded feed-and-alert core of a market-data
//! dashboard. A worker thread advances every subscribed token along a
//! bounded random walk once per tick, publishes each [`PriceUpdate`] to the
//! subscription registry and any attached taps, and evaluates user-defined
//! threshold rules, firing an at-most-once notification when a rule's
//! condition is crossed. The rule collection is durably persisted across
//! restarts.
//!
//! ## Core Concepts
//!
//! - **Subscription**: the live-tracking registration of a token for
//!   tick-based price updates
//! - **Tick**: one firing of the price-advance timer, producing at most one
//!   `PriceUpdate` per subscribed token
//! - **Rule**: a user-defined threshold condition (`above`/`below` a target
//!   price) on a token, tracked through an `Active`/`Triggered` state
//!   machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use tickfeed::storage::FileRuleStore;
//! use tickfeed::{
//!     AlertCondition, AlertEngine, FeedConfig, FeedHandle, LogNotifier,
//!     SubscriptionRegistry, TokenId,
//! };
//!
//! let store = Arc::new(FileRuleStore::open("./data")?);
//! let notifier = Arc::new(LogNotifier::new());
//! let engine = Arc::new(AlertEngine::new(store, notifier)?);
//! let registry = Arc::new(SubscriptionRegistry::new());
//!
//! let feed = FeedHandle::start(FeedConfig::default(), Arc::clone(&registry), Arc::clone(&engine));
//! feed.subscribe(TokenId::new("solana"), "SOL", 100.0)?;
//! engine.add_rule(TokenId::new("solana"), "SOL", 110.0, AlertCondition::Above, 100.0)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod feed;
pub mod notify;
pub mod price;
pub mod registry;
pub mod rule;
pub mod storage;
pub mod token;

// Re-export primary types at crate root for convenience
pub use engine::AlertEngine;
pub use error::{FeedError, FeedResult, ValidationError};
pub use feed::{FeedConfig, FeedHandle, PriceStream};
pub use notify::{
    LogNotifier, NotificationCapability, PermissionState, RecordingNotifier, SentNotification,
};
pub use price::PriceUpdate;
pub use registry::{Subscription, SubscriptionRegistry};
pub use rule::{AlertCondition, AlertRule, RuleId};
pub use storage::{FileRuleStore, InMemoryRuleStore, RuleStore, StorageError, RULES_KEY};
pub use token::TokenId;
