//! # Smsgate - SMS OTP Service
//!
//! Issues one-time passcodes over SMS and verifies them. Codes are stored
//! only as salted hashes with a fixed TTL; issuance is rate limited per
//! phone; delivery goes through Fast2SMS.
//!
//! ## Architecture
//! ```text
//! Client → Smsgate → Fast2SMS
//!             ↓
//!       otp-engine (in-memory stores)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod routes;
mod sms;
mod state;

use config::AppConfig;
use sms::Fast2SmsClient;
use state::AppState;

/// Smsgate - SMS OTP Service
#[derive(Parser, Debug)]
#[command(name = "smsgate")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/smsgate.toml")]
    config: String,

    /// Fast2SMS API key (overrides config)
    #[arg(long, env = "FAST2SMS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading anything else
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Smsgate v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration; a missing API key aborts here
    let config = AppConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Wire the provider client and engine state
    let sender = Arc::new(Fast2SmsClient::new(
        config.api_key.clone(),
        config.sender_id.clone(),
        Duration::from_secs(config.send_timeout_secs),
    )?);
    let state = AppState::new(config.clone(), sender);

    // Spawn the background expiry sweeper
    let sweep_shutdown = shutdown_tx.subscribe();
    tokio::spawn(otp_engine::sweep::sweep_worker(
        state.store.clone(),
        state.limiter.clone(),
        Duration::from_secs(config.sweep_interval_secs),
        sweep_shutdown,
    ));

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Smsgate listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Smsgate shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
