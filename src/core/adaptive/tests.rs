//! Tests for the adaptive limit estimator

use super::*;
use crate::config::AdaptiveConfig;
use std::time::{Duration, Instant};

fn estimator_with(model: &str, guess: u32) -> AdaptiveLimitEstimator {
    let mut config = AdaptiveConfig {
        snapshot_path: None,
        ..AdaptiveConfig::default()
    };
    config.initial_guesses.insert(model.to_string(), guess);
    AdaptiveLimitEstimator::new(config)
}

fn view(estimator: &AdaptiveLimitEstimator, model: &str) -> AdaptiveModelView {
    estimator
        .snapshot()
        .into_iter()
        .find(|v| v.model == model)
        .unwrap()
}

#[test]
fn test_unobserved_model_reports_heuristic_guess() {
    let estimator = estimator_with("gpt-4o", 25);
    assert_eq!(estimator.guess("gpt-4o"), Some(25));
    assert_eq!(estimator.guess("other"), Some(60));
    // Guessing does not create state
    assert!(estimator.snapshot().is_empty());
}

#[test]
fn test_disabled_estimator_is_inert() {
    let config = AdaptiveConfig {
        enabled: false,
        ..AdaptiveConfig::default()
    };
    let estimator = AdaptiveLimitEstimator::new(config);

    estimator.on_reject("gpt-4o");
    estimator.on_success("gpt-4o");

    assert_eq!(estimator.guess("gpt-4o"), None);
    assert!(estimator.snapshot().is_empty());
}

#[test]
fn test_ten_successes_raise_guess_from_ten_to_twelve() {
    let estimator = estimator_with("gpt-4o", 10);
    let now = Instant::now();

    for i in 0..10 {
        estimator.on_success_at("gpt-4o", now + Duration::from_millis(i * 100));
    }

    // Raised once at the eighth success, then held by the increase cooldown
    assert_eq!(estimator.guess("gpt-4o"), Some(12));
}

#[test]
fn test_no_increase_below_saturation() {
    let estimator = estimator_with("gpt-4o", 100);
    let now = Instant::now();

    for _ in 0..50 {
        estimator.on_success_at("gpt-4o", now);
    }
    assert_eq!(estimator.guess("gpt-4o"), Some(100));
}

#[test]
fn test_no_increase_with_rejects_in_window() {
    let estimator = estimator_with("gpt-4o", 10);
    let now = Instant::now();

    estimator.on_reject_at("gpt-4o", now);
    let lowered = estimator.guess("gpt-4o").unwrap();
    for _ in 0..20 {
        estimator.on_success_at("gpt-4o", now);
    }
    assert_eq!(estimator.guess("gpt-4o"), Some(lowered));
}

#[test]
fn test_two_rejects_hard_cap() {
    let estimator = estimator_with("gpt-4o", 10);
    let now = Instant::now();

    estimator.on_success_at("gpt-4o", now);
    estimator.on_reject_at("gpt-4o", now);
    estimator.on_reject_at("gpt-4o", now + Duration::from_secs(1));

    let state = view(&estimator, "gpt-4o");
    assert!(state.hard_capped);
    assert!(state.guess <= 6);
    assert!(state.last_reject_at.is_some());
}

#[test]
fn test_decrease_cooldown_and_hard_cap_factor() {
    let estimator = estimator_with("gpt-4o", 100);
    let start = Instant::now();

    estimator.on_reject_at("gpt-4o", start);
    assert_eq!(estimator.guess("gpt-4o"), Some(60));

    // Inside the cooldown: counted but no further decrease
    estimator.on_reject_at("gpt-4o", start + Duration::from_secs(10));
    assert_eq!(estimator.guess("gpt-4o"), Some(60));
    assert!(view(&estimator, "gpt-4o").hard_capped);

    // After the cooldown the hard-capped factor applies
    estimator.on_reject_at("gpt-4o", start + Duration::from_secs(31));
    assert_eq!(estimator.guess("gpt-4o"), Some(30));
}

#[test]
fn test_hard_cap_never_reverts() {
    let estimator = estimator_with("gpt-4o", 4);
    let start = Instant::now();

    estimator.on_reject_at("gpt-4o", start);
    estimator.on_reject_at("gpt-4o", start);
    assert!(view(&estimator, "gpt-4o").hard_capped);
    let capped = estimator.guess("gpt-4o").unwrap();

    // Many saturated windows, far apart
    for window in 1..20u64 {
        let at = start + Duration::from_secs(window * 600);
        for _ in 0..10 {
            estimator.on_success_at("gpt-4o", at);
        }
    }

    let state = view(&estimator, "gpt-4o");
    assert!(state.hard_capped);
    assert_eq!(state.guess, capped);
}

#[test]
fn test_guess_stays_within_bounds() {
    let estimator = estimator_with("gpt-4o", 190);
    let start = Instant::now();

    for window in 0..10u64 {
        let at = start + Duration::from_secs(window * 301);
        for _ in 0..200 {
            estimator.on_success_at("gpt-4o", at);
        }
    }
    assert_eq!(estimator.guess("gpt-4o"), Some(MAX_GUESS));

    for i in 0..40u64 {
        estimator.on_reject_at("gpt-4o", start + Duration::from_secs(10_000 + i * 31));
    }
    assert_eq!(estimator.guess("gpt-4o"), Some(MIN_GUESS));
}

#[test]
fn test_window_roll_resets_counters() {
    let estimator = estimator_with("gpt-4o", 50);
    let start = Instant::now();

    estimator.on_reject_at("gpt-4o", start);
    assert_eq!(view(&estimator, "gpt-4o").reject_count, 1);

    estimator.on_success_at("gpt-4o", start + Duration::from_secs(61));
    let state = view(&estimator, "gpt-4o");
    assert_eq!(state.reject_count, 0);
    assert_eq!(state.success_count, 1);
}

#[test]
fn test_generic_models_are_ignored() {
    let estimator = estimator_with("gpt-4o", 10);
    for model in ["", "default", "auto", "*", "unknown", "AUTO"] {
        estimator.on_reject(model);
        estimator.on_success(model);
    }
    assert!(estimator.snapshot().is_empty());
    assert!(is_concrete_model("gpt-4o"));
    assert!(!is_concrete_model(" Default "));
}

#[tokio::test]
async fn test_snapshot_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("adaptive.json");

    let estimator = estimator_with("gpt-4o", 10);
    let now = Instant::now();
    estimator.on_reject_at("gpt-4o", now);
    estimator.on_reject_at("gpt-4o", now);
    estimator.save_snapshot(&path).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(raw["savedAt"].is_i64());
    assert_eq!(raw["models"]["gpt-4o"]["guess"], 6);
    assert_eq!(raw["models"]["gpt-4o"]["hardCapped"], true);
    assert!(raw["models"]["gpt-4o"]["lastRejectAt"].is_i64());
    assert!(!dir.path().join("state").join("adaptive.json.tmp").exists());

    let restored = estimator_with("gpt-4o", 10);
    assert_eq!(restored.load_snapshot(&path).await, 1);
    let state = view(&restored, "gpt-4o");
    assert_eq!(state.guess, 6);
    assert!(state.hard_capped);
    assert_eq!(state.reject_count, 0);
}

#[test]
fn test_stale_entries_are_skipped() {
    let estimator = estimator_with("gpt-4o", 10);
    let now_ms = 1_700_000_000_000_i64;
    let day_ms = 24 * 60 * 60 * 1000;

    let mut models = std::collections::BTreeMap::new();
    models.insert(
        "fresh".to_string(),
        SnapshotEntry {
            guess: 33,
            hard_capped: false,
            last_reject_at: None,
            updated_at: now_ms - 1000,
        },
    );
    models.insert(
        "stale".to_string(),
        SnapshotEntry {
            guess: 5,
            hard_capped: true,
            last_reject_at: Some(now_ms - day_ms - 5),
            updated_at: now_ms - day_ms - 5,
        },
    );

    let loaded = estimator.seed_from(
        SnapshotFile {
            saved_at: now_ms,
            models,
        },
        now_ms,
    );

    assert_eq!(loaded, 1);
    assert_eq!(estimator.guess("fresh"), Some(33));
    assert_eq!(estimator.guess("stale"), Some(60));
}

#[tokio::test]
async fn test_missing_or_corrupt_snapshot_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let estimator = estimator_with("gpt-4o", 10);

    assert_eq!(estimator.load_snapshot(&dir.path().join("absent.json")).await, 0);

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, b"{not json").unwrap();
    assert_eq!(estimator.load_snapshot(&corrupt).await, 0);
    assert_eq!(estimator.guess("gpt-4o"), Some(10));
}
