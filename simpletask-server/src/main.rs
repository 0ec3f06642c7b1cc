//! `SimpleTask` document server -- in-memory JSON document store over HTTP.
//!
//! Serves the collection API the `simpletask` client talks to. Documents
//! live in memory only; restarting the server clears them.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:7878
//! cargo run --bin simpletask-server
//!
//! # Run on custom address
//! cargo run --bin simpletask-server -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! SIMPLETASK_SERVER_ADDR=127.0.0.1:8080 cargo run --bin simpletask-server
//! ```

use std::sync::Arc;

use clap::Parser;
use simpletask_server::config::{ServerCliArgs, ServerConfig};
use simpletask_server::server;
use simpletask_server::store::DocumentStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + env vars + config file + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting simpletask document server");

    let store = Arc::new(DocumentStore::new());

    match server::start_server_with_state(&config.bind_addr, store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "document server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "document server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start document server");
            std::process::exit(1);
        }
    }
}
