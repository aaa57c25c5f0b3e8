//! Durable rule storage across restarts.

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use tickfeed::{
    AlertCondition, AlertEngine, FileRuleStore, NotificationCapability, RecordingNotifier,
    RuleStore, TokenId, RULES_KEY,
};

fn granting() -> Arc<dyn NotificationCapability> {
    Arc::new(RecordingNotifier::granting())
}

fn sol() -> TokenId {
    TokenId::new("solana")
}

#[test]
fn saved_rules_survive_a_reload() {
    let dir = tempdir().unwrap();

    let engine = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();
    engine
        .add_rule(sol(), "SOL", 110.0, AlertCondition::Above, 100.0)
        .unwrap();
    engine
        .add_rule(TokenId::new("bitcoin"), "BTC", 30_000.0, AlertCondition::Below, 40_000.0)
        .unwrap();
    let before = engine.all_rules();

    // "Restart": a fresh store and engine over the same directory.
    let reloaded = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();
    assert_eq!(reloaded.all_rules(), before);
}

#[test]
fn triggered_state_survives_a_reload_without_renotifying() {
    let dir = tempdir().unwrap();

    let notifier = Arc::new(RecordingNotifier::granting());
    let engine = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        Arc::clone(&notifier) as Arc<dyn NotificationCapability>,
    )
    .unwrap();
    engine
        .add_rule(sol(), "SOL", 110.0, AlertCondition::Above, 100.0)
        .unwrap();
    engine.evaluate(&sol(), 111.0);
    assert_eq!(notifier.sent_count(), 1);

    let fresh_notifier = Arc::new(RecordingNotifier::granting());
    let reloaded = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        Arc::clone(&fresh_notifier) as Arc<dyn NotificationCapability>,
    )
    .unwrap();

    assert!(reloaded.active_rules().is_empty());
    assert!(reloaded.evaluate(&sol(), 115.0).is_empty());
    assert_eq!(fresh_notifier.sent_count(), 0);
}

#[test]
fn removal_is_persisted() {
    let dir = tempdir().unwrap();

    let engine = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();
    let keep = engine
        .add_rule(sol(), "SOL", 110.0, AlertCondition::Above, 100.0)
        .unwrap();
    let removed = engine
        .add_rule(sol(), "SOL", 90.0, AlertCondition::Below, 100.0)
        .unwrap();
    engine.remove_rule(removed);

    let reloaded = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();
    let rules = reloaded.all_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, keep);
}

#[test]
fn missing_collection_starts_the_engine_empty() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FileRuleStore::open(dir.path()).unwrap());
    assert!(store.load(RULES_KEY).unwrap().is_none());

    let engine = AlertEngine::new(store, granting()).unwrap();
    assert!(engine.all_rules().is_empty());
}

#[test]
fn unversioned_legacy_layout_is_restored() {
    let dir = tempdir().unwrap();
    let legacy = r#"[{
        "id": "0b0f2c3a-24dd-4b86-b5d2-0d9c2e6f7a11",
        "tokenId": "solana",
        "tokenSymbol": "SOL",
        "targetPrice": 110.0,
        "condition": "above",
        "currentPrice": 100.0,
        "createdAt": "2024-01-01T00:00:00Z",
        "triggered": false
    }]"#;
    fs::write(dir.path().join("priceAlerts.json"), legacy).unwrap();

    let engine = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();

    let rules = engine.all_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id.to_string(), "0b0f2c3a-24dd-4b86-b5d2-0d9c2e6f7a11");
    assert_eq!(rules[0].token_id, sol());
    assert_eq!(rules[0].target_price, 110.0);
    assert_eq!(rules[0].condition, AlertCondition::Above);
    assert!(!rules[0].triggered);
}

#[test]
fn saves_rewrite_to_the_versioned_envelope() {
    let dir = tempdir().unwrap();

    let engine = AlertEngine::new(
        Arc::new(FileRuleStore::open(dir.path()).unwrap()),
        granting(),
    )
    .unwrap();
    engine
        .add_rule(sol(), "SOL", 110.0, AlertCondition::Above, 100.0)
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("priceAlerts.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["rules"].as_array().unwrap().len(), 1);
}
