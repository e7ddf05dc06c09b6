//! Completion gateway binary
//!
//! Loads `.env`, parses arguments, reads configuration and serves until a
//! shutdown signal arrives.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use completion_gateway::server::{self, ServerArgs};
use completion_gateway::utils::logging::init_tracing;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = ServerArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print the whole cause chain
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ServerArgs) -> anyhow::Result<()> {
    let config = args
        .load_config()
        .await
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    init_tracing(config.monitoring()).context("failed to initialise logging")?;

    server::run_server(config, &args.config)
        .await
        .context("gateway terminated with an error")
}
