//! HTTP server implementation
//!
//! This module provides the HTTP server and routing functionality.

// Submodules
pub mod middleware;
pub mod routes;

pub mod builder;
pub mod server;
pub mod state;
mod utils;


pub use builder::{ServerArgs, ServerBuilder, run_server};
pub use server::HttpServer;
pub use state::AppState;
