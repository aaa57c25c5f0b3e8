//! Live feed behavior: ticks, subscriber churn, and shutdown.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use tickfeed::{
    AlertCondition, AlertEngine, FeedConfig, FeedHandle, InMemoryRuleStore,
    NotificationCapability, RecordingNotifier, SubscriptionRegistry, TokenId,
};

const TICK: Duration = Duration::from_millis(20);

fn sol() -> TokenId {
    TokenId::new("solana")
}

fn start_feed() -> (FeedHandle, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::granting());
    let engine = Arc::new(
        AlertEngine::new(
            Arc::new(InMemoryRuleStore::new()),
            Arc::clone(&notifier) as Arc<dyn NotificationCapability>,
        )
        .unwrap(),
    );
    let registry = Arc::new(SubscriptionRegistry::new());
    let cfg = FeedConfig {
        tick_interval: TICK,
        ..FeedConfig::default()
    };
    (FeedHandle::start(cfg, registry, engine), notifier)
}

#[test]
fn subscribed_tokens_receive_ticks() {
    let (feed, _notifier) = start_feed();
    feed.subscribe(sol(), "SOL", 100.0).unwrap();

    let stream = feed.updates().unwrap();
    let update = stream.recv_timeout(Duration::from_secs(2)).unwrap();

    assert_eq!(update.token_id, sol());
    assert_eq!(update.symbol, "SOL");
    assert!(update.price > 0.0);
    // The first advance backfills the default volume for a fresh token.
    assert_eq!(update.volume_24h, 1_000_000.0);

    feed.stop();
}

#[test]
fn latest_tracks_the_walk() {
    let (feed, _notifier) = start_feed();
    feed.subscribe(sol(), "SOL", 100.0).unwrap();
    let initial = feed.latest(&sol()).unwrap();
    assert_eq!(initial.price, 100.0);
    assert_eq!(initial.volume_24h, 0.0);

    sleep(TICK * 10);

    let later = feed.latest(&sol()).unwrap();
    assert!(later.timestamp > initial.timestamp);
    assert_eq!(later.volume_24h, 1_000_000.0);
    // Bounded steps from 100 stay well inside this envelope even if the
    // sleep overruns by a few multiples.
    assert!(later.price > 60.0 && later.price < 165.0);

    feed.stop();
}

#[test]
fn unsubscribe_halts_ticks_and_retains_the_latest_value() {
    let (feed, _notifier) = start_feed();
    feed.subscribe(sol(), "SOL", 100.0).unwrap();
    sleep(TICK * 5);

    feed.unsubscribe(sol());
    // Allow the boundary (and any in-flight tick) to pass.
    sleep(TICK * 5);

    let frozen = feed.latest(&sol()).unwrap();
    sleep(TICK * 5);
    let after = feed.latest(&sol()).unwrap();

    assert_eq!(frozen, after);

    feed.stop();
}

#[test]
fn a_feed_with_no_subscribers_idles_quietly() {
    let (feed, _notifier) = start_feed();
    sleep(TICK * 5);

    assert_eq!(feed.registry().live_count(), 0);
    assert_eq!(feed.dropped_updates(), 0);

    feed.stop();
}

#[test]
fn live_ticks_drive_alerts_at_most_once() {
    let (feed, notifier) = start_feed();
    feed.subscribe(sol(), "SOL", 100.0).unwrap();

    // Every simulated price satisfies "below 1e6", so the first evaluated
    // tick fires and all later crossings must stay silent.
    feed.engine()
        .add_rule(sol(), "SOL", 1_000_000.0, AlertCondition::Below, 100.0)
        .unwrap();

    sleep(TICK * 10);

    assert_eq!(notifier.sent_count(), 1);
    assert!(feed.engine().rules_for_token(&sol()).is_empty());

    feed.stop();
}

#[test]
fn resubscribing_does_not_reset_the_price() {
    let (feed, _notifier) = start_feed();
    feed.subscribe(sol(), "SOL", 100.0).unwrap();
    sleep(TICK * 3);

    feed.subscribe(sol(), "SOL", 555.0).unwrap();

    let latest = feed.latest(&sol()).unwrap();
    assert!(latest.price < 200.0, "price was reset to {}", latest.price);

    feed.stop();
}

#[test]
fn stop_disconnects_subsequent_operations() {
    let (feed, _notifier) = start_feed();
    feed.stop();

    let err = feed.subscribe(sol(), "SOL", 100.0).unwrap_err();
    assert!(err.is_disconnected());
    assert!(feed.updates().unwrap_err().is_disconnected());

    // Stop is idempotent.
    feed.stop();
}
