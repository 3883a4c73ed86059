//! homeprom exporter
//!
//! Polls the configured sources (Hue bridge, Open-Meteo, quote page) on their
//! own schedules and serves the latest values on `/metrics`.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use homeprom_core::error::{HomepromError, Result};
use homeprom_exporter::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "homeprom-exporter exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen = cfg.server.listen_addr()?;

    let (state, tasks) = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| HomepromError::Internal(format!("failed to bind {listen}: {e}")))?;

    // Handles live as long as the server; tasks end with the runtime.
    let handles: Vec<_> = tasks.into_iter().map(|t| t.start()).collect();
    for h in &handles {
        tracing::debug!(source = %h.source(), "refresh task spawned");
    }

    tracing::info!(%listen, collectors = ?state.registry().registered(), "homeprom-exporter starting");
    axum::serve(listener, app)
        .await
        .map_err(|e| HomepromError::Internal(format!("server failed: {e}")))?;
    Ok(())
}
