//! Live price feed subsystem.
//!
//! A dedicated worker thread advances every live token along a bounded
//! random walk once per tick, records each resulting [`PriceUpdate`] in the
//! subscription registry, evaluates alert rules, and fans the update out to
//! any attached taps. Control operations arrive on a bounded channel and
//! are serviced between ticks, so a tick's advance-and-evaluate pass is
//! never interleaved with subscriber churn.
//!
//! The walk is a simulation substitute for a real streaming market-data
//! connection; swapping in a live source would leave the alert engine's
//! contract untouched, since evaluation only depends on receiving
//! `PriceUpdate` values.
//!
//! [`PriceUpdate`]: crate::price::PriceUpdate

mod generator;
mod stream;

pub use generator::{FeedConfig, FeedHandle};
pub use stream::PriceStream;
