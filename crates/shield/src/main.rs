//! `privacy-shield` service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise tracing (JSON logs, optional OTLP export).
//! 3. Build the [`ProtectionPipeline`], [`SessionStore`] and authenticator.
//! 4. Spawn the idle-session eviction task.
//! 5. Build the Axum router and serve until Ctrl-C.

mod auth;
mod classify;
mod config;
mod crypto;
mod pipeline;
mod server;
mod session;
mod telemetry;
mod tokenize;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use auth::StaticTokenAuthenticator;
use config::Config;
use crypto::RandomSource;
use pipeline::ProtectionPipeline;
use server::state::AppState;
use session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "privacy-shield starting"
    );

    // -----------------------------------------------------------------------
    // 3. Pipeline, sessions, authentication
    // -----------------------------------------------------------------------
    let random = RandomSource::os();
    let pipeline = ProtectionPipeline::new(random.clone(), cfg.max_input_bytes);
    let sessions = SessionStore::new();
    let authenticator = Arc::new(StaticTokenAuthenticator::new(&cfg.auth_token, &random));

    // -----------------------------------------------------------------------
    // 4. Background tasks
    // -----------------------------------------------------------------------
    let _session_eviction = session::eviction_task(sessions.clone(), &cfg);

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        pipeline,
        sessions,
        authenticator,
        cfg.session_header_name.clone(),
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("privacy-shield stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
