//! Token bucket kept as a Redis hash
//!
//! Refill and consume run in one script so concurrent gateways never
//! over-grant. The server clock is used so instances need not agree on time.

use super::pool::RedisPool;
use crate::storage::bucket::{BucketOutcome, BucketParams, SharedBucketStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use tracing::debug;

const TOKEN_BUCKET_LUA: &str = r#"
local capacity = tonumber(ARGV[1])
local refill = tonumber(ARGV[2])
local ttl = tonumber(ARGV[3])

local t = redis.call('TIME')
local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)

local state = redis.call('HMGET', KEYS[1], 'tokens', 'last_refill')
local tokens = tonumber(state[1])
local last = tonumber(state[2])
if tokens == nil or last == nil then
  tokens = capacity
  last = now
end

local elapsed = math.max(0, now - last) / 1000.0
tokens = math.min(capacity, tokens + elapsed * refill)

local allowed = 0
local retry_after = 0
if tokens >= 1 then
  tokens = tokens - 1
  allowed = 1
elseif refill > 0 then
  retry_after = math.ceil((1 - tokens) / refill * 1000)
else
  retry_after = 60000
end

redis.call('HSET', KEYS[1], 'tokens', tostring(tokens), 'last_refill', tostring(now))
redis.call('EXPIRE', KEYS[1], ttl)

return { allowed, math.floor(tokens), retry_after }
"#;

pub(super) fn script() -> redis::Script {
    redis::Script::new(TOKEN_BUCKET_LUA)
}

#[async_trait]
impl SharedBucketStore for RedisPool {
    async fn take(&self, key: &str, params: BucketParams) -> Result<BucketOutcome> {
        let mut conn = self.connection().await?;

        let mut invocation = self.script.prepare_invoke();
        invocation
            .key(key)
            .arg(params.capacity)
            .arg(params.refill_per_sec)
            .arg(params.ttl_secs);

        let result: Result<(i64, i64, i64)> = self
            .with_timeout(invocation.invoke_async(&mut conn))
            .await;

        let (allowed, remaining, retry_after_ms) = match result {
            Ok(values) => values,
            Err(e) => {
                self.invalidate();
                return Err(e);
            }
        };

        debug!(key, allowed, remaining, "Token bucket evaluated");
        Ok(BucketOutcome {
            allowed: allowed == 1,
            remaining: remaining.clamp(0, i64::from(u32::MAX)) as u32,
            retry_after_ms: retry_after_ms.max(0) as u64,
        })
    }

    async fn ping(&self) -> Result<()> {
        self.health_check().await
    }
}
