use crate::api;
use crate::host::MeldState;
use crate::infrastructure::config::{server::ServerSettings, Settings};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// Builds the daemon's router: control API, both event transports, the
/// metrics endpoint and, when configured, the viewer bundle as a fallback.
///
/// `metrics` is `None` when no Prometheus recorder is installed; `/metrics`
/// then renders an empty exposition.
pub fn build_router(
    state: MeldState,
    settings: &ServerSettings,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let mut router = api::routes().route(
        "/metrics",
        get(move || {
            let body = metrics.as_ref().map(PrometheusHandle::render).unwrap_or_default();
            std::future::ready(body)
        }),
    );

    if let Some(dir) = &settings.static_dir {
        info!(dir = %dir.display(), "Serving viewer bundle");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// When `shutdown` fires, every subscriber stream on `state` is ended so the
/// graceful drain does not wait on them.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    state: MeldState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(
                subscribers = state.broadcaster().client_count(),
                "Closing event streams"
            );
            state.close_streams();
        })
        .await?;
    Ok(())
}

/// Binds the configured address and runs the daemon's HTTP server.
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the server fails while running.
pub async fn run_server(
    config: &Settings,
    state: MeldState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder, /metrics will be empty");
            None
        }
    };

    let app = build_router(state.clone(), &config.server, handle);
    let addr = config.bind_address().to_socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Meld daemon listening");
    serve(listener, app, state, shutdown).await
}
