//! Thin HTTP adapter (spec SPEC_FULL §10.2).
//!
//! Exposes `POST /v1/search`, mapped 1:1 onto the library's `search` entry
//! point, and `GET /healthz` for liveness. HTTP status is always 200 for a
//! well-formed Search Response (the `status` field inside the JSON body
//! carries success/error, per spec §6); only a malformed request body that
//! fails to deserialize yields a 400, carried through the `ApiError`/
//! `ErrorResponse` convention below (ported from the teacher's
//! `src/server/mod.rs`).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::models::{SearchRequest, SearchResponse};
use crate::search::SearchEngine;

/// Liveness-probe response payload.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON error body returned by the API.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Error type used by HTTP handlers to map request failures into JSON
/// error responses.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Shared application state: the single open index handle.
type AppState = Arc<SearchEngine>;

/// Build the Axum router for the search HTTP API.
pub fn router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/search", post(search))
        .with_state(engine)
}

/// Run the HTTP server bound to `addr`, serving `engine` for its lifetime.
pub async fn run(addr: SocketAddr, engine: SearchEngine) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, engine).await
}

/// Run the HTTP server using an existing `TcpListener`. Used by tests that
/// need to bind to an ephemeral port.
pub async fn serve_with_listener(listener: TcpListener, engine: SearchEngine) -> Result<()> {
    let app = router(Arc::new(engine));
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn search(
    State(engine): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body?;
    Ok(Json(engine.search(&request)))
}
