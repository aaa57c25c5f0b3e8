//! Tick generator worker.
//!
//! This module owns the recurring price-advance timer. Subscribe and
//! unsubscribe requests are applied between ticks; each tick advances all
//! live tokens, evaluates alert rules, and fans the updates out to attached
//! taps before the next channel event is serviced. Missed ticks coalesce,
//! so no tick ever overlaps another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use rand::Rng;
use tracing::info;

use crate::engine::AlertEngine;
use crate::error::{FeedError, FeedResult};
use crate::price::PriceUpdate;
use crate::registry::SubscriptionRegistry;
use crate::token::TokenId;

use super::stream::PriceStream;

/// Relative price move per tick: uniform in `(-MAX_STEP, +MAX_STEP)`.
const MAX_STEP: f64 = 0.005;

/// Volume substituted for tokens that have not reported any yet.
const DEFAULT_VOLUME: f64 = 1_000_000.0;

/// Tunables for the tick worker.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Interval between price-advance ticks.
    pub tick_interval: Duration,
    /// Max queued control messages (subscribe/unsubscribe).
    pub control_queue_capacity: usize,
    /// Per-tap stream buffer capacity.
    pub stream_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(3),
            control_queue_capacity: 1024,
            stream_capacity: 1024,
        }
    }
}

pub(crate) enum ControlMsg {
    Subscribe {
        token_id: TokenId,
        symbol: String,
        initial_price: f64,
        reply: Sender<()>,
    },
    Unsubscribe {
        token_id: TokenId,
    },
    Tap {
        tx: Sender<PriceUpdate>,
        reply: Sender<()>,
    },
    Shutdown,
}

/// Handle to a running price feed.
///
/// Obtained from [`FeedHandle::start`]. Dropping the handle detaches the
/// worker, which exits once its control channel disconnects; prefer
/// [`stop`](Self::stop) for a deterministic shutdown.
pub struct FeedHandle {
    cfg: FeedConfig,
    control_tx: Sender<ControlMsg>,
    registry: Arc<SubscriptionRegistry>,
    engine: Arc<AlertEngine>,
    dropped_updates: Arc<AtomicU64>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl FeedHandle {
    /// Spawn the tick worker and return the controlling handle.
    #[must_use]
    pub fn start(
        cfg: FeedConfig,
        registry: Arc<SubscriptionRegistry>,
        engine: Arc<AlertEngine>,
    ) -> Self {
        let (control_tx, control_rx) = bounded(cfg.control_queue_capacity.max(1));
        let dropped_updates = Arc::new(AtomicU64::new(0));

        let worker_registry = Arc::clone(&registry);
        let worker_engine = Arc::clone(&engine);
        let worker_dropped = Arc::clone(&dropped_updates);
        let interval = cfg.tick_interval;
        let join = thread::Builder::new()
            .name("tickfeed-worker".to_string())
            .spawn(move || {
                worker_loop(
                    interval,
                    worker_registry,
                    worker_engine,
                    worker_dropped,
                    control_rx,
                )
            })
            .expect("failed to spawn tickfeed worker");

        Self {
            cfg,
            control_tx,
            registry,
            engine,
            dropped_updates,
            join: Mutex::new(Some(join)),
        }
    }

    /// Begin producing ticks for a token.
    ///
    /// Idempotent: an existing subscription keeps its current price. Blocks
    /// until the worker has applied the registration, so a subsequent
    /// [`latest`](Self::latest) read observes the token.
    ///
    /// # Errors
    /// [`FeedError::Disconnected`] if the worker has shut down.
    pub fn subscribe(
        &self,
        token_id: TokenId,
        symbol: impl Into<String>,
        initial_price: f64,
    ) -> FeedResult<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.control_tx
            .send(ControlMsg::Subscribe {
                token_id,
                symbol: symbol.into(),
                initial_price,
                reply: reply_tx,
            })
            .map_err(|_| disconnected())?;
        reply_rx.recv().map_err(|_| disconnected())
    }

    /// Stop producing ticks for a token, no later than the next tick
    /// boundary. Fire-and-forget and idempotent. The last observed price
    /// stays readable via [`latest`](Self::latest).
    pub fn unsubscribe(&self, token_id: TokenId) {
        let _ = self.control_tx.try_send(ControlMsg::Unsubscribe { token_id });
    }

    /// Last observed update for a token. Non-blocking.
    #[must_use]
    pub fn latest(&self, token_id: &TokenId) -> Option<PriceUpdate> {
        self.registry.latest(token_id)
    }

    /// Attach a bounded tap receiving every emitted update.
    ///
    /// # Errors
    /// [`FeedError::Disconnected`] if the worker has shut down.
    pub fn updates(&self) -> FeedResult<PriceStream> {
        let (tx, rx) = bounded(self.cfg.stream_capacity.max(1));
        let (reply_tx, reply_rx) = bounded(1);
        self.control_tx
            .send(ControlMsg::Tap {
                tx,
                reply: reply_tx,
            })
            .map_err(|_| disconnected())?;
        reply_rx.recv().map_err(|_| disconnected())?;
        Ok(PriceStream::new(rx))
    }

    /// Updates dropped because a tap consumer fell behind.
    #[must_use]
    pub fn dropped_updates(&self) -> u64 {
        self.dropped_updates.load(Ordering::Relaxed)
    }

    /// The registry backing this feed.
    #[must_use]
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// The alert engine this feed evaluates against.
    #[must_use]
    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    /// Shut the worker down and wait for it to exit. Idempotent.
    pub fn stop(&self) {
        let _ = self.control_tx.send(ControlMsg::Shutdown);
        if let Some(handle) = self.join.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        // Detach rather than join: the worker exits once the last control
        // sender is gone, and callers may drop the handle from contexts
        // that must not block.
        let _ = self.control_tx.try_send(ControlMsg::Shutdown);
        if let Some(handle) = self.join.lock().take() {
            drop(handle);
        }
    }
}

fn disconnected() -> FeedError {
    FeedError::Disconnected {
        path: "feed_control".to_string(),
    }
}

fn worker_loop(
    interval: Duration,
    registry: Arc<SubscriptionRegistry>,
    engine: Arc<AlertEngine>,
    dropped_updates: Arc<AtomicU64>,
    control_rx: Receiver<ControlMsg>,
) {
    info!(interval_ms = interval.as_millis() as u64, "price feed worker started");

    let ticker = tick(interval);
    let mut rng = rand::rng();
    let mut taps: Vec<Sender<PriceUpdate>> = Vec::new();

    loop {
        select! {
            recv(control_rx) -> msg => match msg {
                Ok(ControlMsg::Subscribe { token_id, symbol, initial_price, reply }) => {
                    registry.subscribe(token_id, symbol, initial_price);
                    let _ = reply.send(());
                }
                Ok(ControlMsg::Unsubscribe { token_id }) => {
                    registry.unsubscribe(&token_id);
                }
                Ok(ControlMsg::Tap { tx, reply }) => {
                    taps.push(tx);
                    let _ = reply.send(());
                }
                Ok(ControlMsg::Shutdown) | Err(_) => break,
            },
            recv(ticker) -> _ => {
                run_tick(&registry, &engine, &dropped_updates, &mut taps, &mut rng);
            }
        }
    }

    info!("price feed worker stopped");
}

/// One advance-and-evaluate pass over every live token.
///
/// A tick with no live tokens is a cheap no-op; the timer keeps running so
/// the generator's lifecycle stays independent of subscriber churn.
fn run_tick(
    registry: &SubscriptionRegistry,
    engine: &AlertEngine,
    dropped_updates: &AtomicU64,
    taps: &mut Vec<Sender<PriceUpdate>>,
    rng: &mut impl Rng,
) {
    for previous in registry.live_snapshot() {
        let update = advance(&previous, rng);
        registry.record(update.clone());
        engine.evaluate(&update.token_id, update.price);

        // Never block the tick: drop for slow taps, prune dead ones.
        taps.retain(|tap| match tap.try_send(update.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                dropped_updates.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

/// Advance a price one bounded random-walk step.
fn advance(previous: &PriceUpdate, rng: &mut impl Rng) -> PriceUpdate {
    let delta = rng.random_range(-MAX_STEP..MAX_STEP);
    let volume = if previous.volume_24h > 0.0 {
        previous.volume_24h
    } else {
        DEFAULT_VOLUME
    };

    PriceUpdate {
        token_id: previous.token_id.clone(),
        symbol: previous.symbol.clone(),
        price: previous.price * (1.0 + delta),
        // Deltas accumulate additively; the simulation has no real
        // 24-hour window to recompute from.
        change_24h: previous.change_24h + delta * 100.0,
        volume_24h: volume,
        timestamp: Utc::now(),
    }
}
