//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection handling and health checks
//! - `token_bucket` - Atomic refill-and-consume script
//! - `tests` - Module tests

mod pool;
mod token_bucket;
#[cfg(test)]
mod tests;

pub use pool::RedisPool;
