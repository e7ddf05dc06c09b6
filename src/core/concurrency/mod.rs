//! Bounded upstream concurrency
//!
//! At most `max_concurrent` upstream calls run at once. Further callers wait
//! in a strictly FIFO queue of bounded length, each with a hard timeout.

mod gate;
mod permit;
mod types;


pub use gate::ConcurrencyGate;
pub use permit::GatePermit;
