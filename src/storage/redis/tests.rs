//! Redis module tests
//!
//! Most run without a Redis server: they cover construction and the
//! failure paths the rate limiter relies on for its fallback. The ignored
//! ones exercise the token bucket script against a live server.

use super::pool::RedisPool;
use crate::config::RedisConfig;
use crate::storage::{BucketParams, SharedBucketStore};
use crate::utils::error::GatewayError;

fn unreachable_config() -> RedisConfig {
    RedisConfig {
        // Port 1 is reserved; connections are refused immediately
        url: "redis://:secret@127.0.0.1:1/0".to_string(),
        enabled: true,
        timeout_ms: 200,
    }
}

#[test]
fn test_display_url_hides_password() {
    let pool = RedisPool::new(&unreachable_config()).unwrap();
    assert!(!pool.display_url().contains("secret"));
}

#[test]
fn test_invalid_url_is_rejected() {
    let config = RedisConfig {
        url: "not-a-redis-url".to_string(),
        ..unreachable_config()
    };
    assert!(matches!(RedisPool::new(&config), Err(GatewayError::Redis(_))));
}

#[tokio::test]
async fn test_unreachable_store_errors_instead_of_hanging() {
    let pool = RedisPool::new(&unreachable_config()).unwrap();

    assert!(pool.ping().await.is_err());

    let params = BucketParams {
        capacity: 5,
        refill_per_sec: 1.0,
        ttl_secs: 120,
    };
    assert!(pool.take("ratelimit:anon:gpt-4o", params).await.is_err());
}

// The tests below need a running Redis (REDIS_URL, default localhost):
// cargo test -- --ignored

fn live_pool() -> RedisPool {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    RedisPool::new(&RedisConfig {
        url,
        enabled: true,
        timeout_ms: 1_000,
    })
    .unwrap()
}

fn fresh_key() -> String {
    format!("ratelimit:test-{}:gpt-4o", uuid::Uuid::new_v4())
}

/// base 5 per minute, no leeway
fn five_per_minute() -> BucketParams {
    BucketParams {
        capacity: 5,
        refill_per_sec: 5.0 / 60.0,
        ttl_secs: 120,
    }
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_bucket_allows_capacity_then_denies() {
    let pool = live_pool();
    let key = fresh_key();

    for expected_remaining in (0..5).rev() {
        let outcome = pool.take(&key, five_per_minute()).await.unwrap();
        assert!(outcome.allowed);
        assert_eq!(outcome.remaining, expected_remaining);
        assert_eq!(outcome.retry_after_ms, 0);
    }

    let denied = pool.take(&key, five_per_minute()).await.unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    // One token per 12s
    assert!(denied.retry_after_ms > 0 && denied.retry_after_ms <= 12_000);

    // Denials do not consume: the hint only shrinks
    let again = pool.take(&key, five_per_minute()).await.unwrap();
    assert!(!again.allowed);
    assert!(again.retry_after_ms <= denied.retry_after_ms);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_bucket_refills_one_token_after_interval() {
    let pool = live_pool();
    let key = fresh_key();

    for _ in 0..5 {
        assert!(pool.take(&key, five_per_minute()).await.unwrap().allowed);
    }
    let denied = pool.take(&key, five_per_minute()).await.unwrap();
    assert!(!denied.allowed);

    tokio::time::sleep(std::time::Duration::from_millis(denied.retry_after_ms + 250)).await;

    let refilled = pool.take(&key, five_per_minute()).await.unwrap();
    assert!(refilled.allowed);
    assert!(!pool.take(&key, five_per_minute()).await.unwrap().allowed);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_shrunken_capacity_clamps_stored_tokens() {
    let pool = live_pool();
    let key = fresh_key();

    // Full bucket of 5, one taken: 4 left
    let first = pool.take(&key, five_per_minute()).await.unwrap();
    assert_eq!(first.remaining, 4);

    // Capacity lowered to 2: stored tokens clamp to 2 before consuming
    let shrunk = BucketParams {
        capacity: 2,
        ..five_per_minute()
    };
    let outcome = pool.take(&key, shrunk).await.unwrap();
    assert!(outcome.allowed);
    assert_eq!(outcome.remaining, 1);

    assert!(pool.take(&key, shrunk).await.unwrap().allowed);
    assert!(!pool.take(&key, shrunk).await.unwrap().allowed);
}
