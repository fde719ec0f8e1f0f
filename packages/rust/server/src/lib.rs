//! HTTP surface for SRS Guard.
//!
//! Routes:
//! - `GET /health`
//! - `POST /check-plagiarism` (multipart field `file`)

pub mod errors;
pub mod handlers;
pub mod models;
pub mod upload;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use srsguard_core::Services;
use srsguard_shared::ServerConfig;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

pub use errors::ApiError;
pub use models::{CheckResponse, HealthResponse};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Largest accepted PDF, in bytes.
    pub max_upload_bytes: usize,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/health", get(handlers::health))
        .route("/check-plagiarism", post(handlers::check_plagiarism))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Bind `config.host:config.port` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, services: Services) -> std::io::Result<()> {
    let app = create_router(AppState {
        services,
        max_upload_bytes: config.max_upload_bytes,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Tag every request with an id, reusing one supplied by the client.
async fn request_id(req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
