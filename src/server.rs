//! Axum router setup and graceful shutdown.
//!
//! [`build_router`] mounts the echo and health handlers, each wrapped as
//! `access_log(app_headers(status, handler))`, behind a catch-panic layer.
//! [`shutdown_signal`] resolves on SIGTERM / Ctrl+C.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::Config;
use crate::echo::echo_handler;
use crate::handler::{into_route, Handler};
use crate::health::health_handler;
use crate::middleware::{with_access_log, with_app_headers, RecordSink};
use crate::version::AppIdentity;

/// Wrap `handler` in the standard middleware stack: identity headers and a
/// fixed `status` first, the access log around both.
pub fn instrument<H: Handler>(
    handler: H,
    identity: &AppIdentity,
    status: StatusCode,
    sink: Arc<dyn RecordSink>,
) -> impl Handler {
    with_access_log(sink, with_app_headers(identity.clone(), status, handler))
}

pub fn build_router(config: &Config, sink: Arc<dyn RecordSink>) -> Router {
    let echo = instrument(
        echo_handler(&config.text),
        &config.identity,
        config.status_code,
        Arc::clone(&sink),
    );
    let health = instrument(health_handler, &config.identity, StatusCode::OK, sink);

    Router::new()
        .route("/health", into_route(health))
        .fallback_service(into_route(echo))
        .layer(ServiceBuilder::new().layer(CatchPanicLayer::new()))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
