//! Calculator API Verifier - reference service
//!
//! Serves the calculator contract over HTTP so the verifier can be pointed
//! at something real during development. Run two instances to stand in for
//! the primary and mock endpoints.

#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use calc_common::mock_service::{ServiceState, create_router};
use calc_common::{LogConfig, init_logging};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "calc-stub")]
#[command(author, version, about = "Calculator API Verifier - reference calculator service")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Delay every calculation by this many milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("info").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cli.host, cli.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;

    let state = Arc::new(ServiceState::new(Duration::from_millis(cli.latency_ms)));
    let router = create_router(state.clone());

    info!(addr = %local_addr, latency_ms = cli.latency_ms, "calculator service listening");
    // Tests and scripts read this line to find the port.
    println!("listening on http://{local_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(
        requests_served = state.requests_served(),
        "calculator service stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
