//! `meld-kernel` binary: runs the Meld daemon until Ctrl-C or SIGTERM.
//!
//! Settings come from `MELD__*` environment variables; see
//! [`meld_kernel::infrastructure::config`].

#![warn(missing_docs)]

use meld_kernel::host::MeldState;
use meld_kernel::infrastructure::{audit, config::Settings, server, telemetry::TelemetryBuilder};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Settings::new()?;

    TelemetryBuilder::from_settings(&config.telemetry, env!("CARGO_PKG_VERSION")).init()?;

    info!("Meld daemon starting...");
    audit::log_audit(&audit::AuditEvent::SystemStartup {
        component: "Daemon".into(),
        address: format!("{}:{}", config.server.host, config.server.port),
    });

    let state = MeldState::new(&config);

    if let Err(e) = server::run_server(&config, state.clone(), shutdown_signal()).await {
        error!("Daemon server failed: {:?}", e);
        state.shutdown();
        return Err(e);
    }

    info!("Shutdown signal received, cleaning up...");
    state.shutdown();
    audit::log_audit(&audit::AuditEvent::SystemShutdown {
        reason: "Signal received".into(),
    });

    info!("Meld daemon shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
