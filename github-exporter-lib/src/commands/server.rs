//! HTTP surface of the exporter.

use crate::Result;
use crate::collectors::{Exporter, encode_text};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use ohno::IntoAppError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOG_TARGET: &str = "    server";

#[derive(Debug, Clone)]
struct AppState {
    exporter: Arc<Exporter>,
    cancel: CancellationToken,
    metrics_path: Arc<str>,
}

/// Builds the router serving `metrics_path`, the health probes, and an index page.
pub fn router(exporter: Arc<Exporter>, metrics_path: &str, cancel: CancellationToken) -> Router {
    let state = AppState {
        exporter,
        cancel,
        metrics_path: Arc::from(metrics_path),
    };

    let mut router = Router::new()
        .route("/healthz", get(health))
        .route("/readyz", get(health))
        .route(metrics_path, get(metrics));

    if metrics_path != "/" {
        router = router.route("/", get(index));
    }

    router.with_state(state)
}

/// Serves `router` on `listener` until `cancel` fires, then drains in-flight requests.
pub async fn run_server(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .into_app_err("running HTTP server")
}

/// Cancels `cancel` on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!(target: LOG_TARGET, "Could not listen for Ctrl-C: {e}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                let _ = signal.recv().await;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not listen for SIGTERM: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
        () = cancel.cancelled() => return,
    }

    log::info!(target: LOG_TARGET, "Shutdown signal received, stopping");
    cancel.cancel();
}

async fn metrics(State(state): State<AppState>) -> Response {
    let families = state.exporter.gather(&state.cancel).await;

    match encode_text(&families) {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            log::error!(target: LOG_TARGET, "Could not render metrics: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "could not render metrics").into_response()
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let path = &state.metrics_path;
    Html(format!(
        "<html>\n<head><title>GitHub Exporter</title></head>\n<body>\n<h1>GitHub Exporter</h1>\n<p><a href=\"{path}\">Metrics</a></p>\n</body>\n</html>\n"
    ))
}
