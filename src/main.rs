// SPDX-License-Identifier: MIT
use anyhow::Result;
use clap::Parser;
use flight_app::config::Config;
use flight_app::http::{router, AppState};
use flight_app::instruments::Instruments;
use flight_app::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    let telemetry = init_telemetry(config.telemetry_config())?;

    let state = AppState::new(Instruments::new(&telemetry.meter()));
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(address = %listener.local_addr()?, "flight app listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    // Provider shutdown blocks on the final exports; failures are logged inside.
    tokio::task::spawn_blocking(move || telemetry.shutdown()).await??;
    Ok(())
}
