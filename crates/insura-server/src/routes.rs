//! Axum routes and error mapping

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use insura_core::{Embedder, Error, VectorStore};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::schemas::{AnswerResponse, AskRequest, SearchRequest, SearchResponse, SourceItem};
use crate::service::{AnswerOutcome, AnswerService};

/// Shared per-process state: the orchestrator plus a store handle for the
/// health endpoint. Everything inside is read-only and `Arc`-shared; no
/// locking anywhere on the request path.
pub struct AppState<S: VectorStore, E: Embedder> {
    pub service: AnswerService<S, E>,
    pub store: Arc<S>,
}

/// Error taxonomy → HTTP status.
///
/// `RetrievalUnavailable` maps to 503 so clients can show a service-health
/// message instead of a content message; a 404 is reserved for the
/// no-context outcome and never produced from an error.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::RetrievalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "Insurance RAG API" }))
}

async fn health<S, E>(State(state): State<Arc<AppState<S, E>>>) -> Json<serde_json::Value>
where
    S: VectorStore + 'static,
    E: Embedder + 'static,
{
    let store_ok = state.store.healthy().await;
    Json(json!({ "ok": true, "store": store_ok }))
}

async fn ask<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    Json(body): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, Response>
where
    S: VectorStore + 'static,
    E: Embedder + 'static,
{
    let request_id = Uuid::new_v4();
    info!(%request_id, policy_type = ?body.policy_type, top_k = body.top_k, "qa/ask");

    let outcome = state
        .service
        .ask(
            &body.question,
            body.policy_type.as_deref(),
            body.top_k_clamped(),
            body.max_tokens_clamped(),
        )
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    match outcome {
        AnswerOutcome::Answered(answer) => Ok(Json(AnswerResponse {
            answer: answer.answer,
            sources: answer.sources.iter().map(SourceItem::from).collect(),
            model: answer.model,
        })),
        AnswerOutcome::NoContext => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "relevant context not found" })),
        )
            .into_response()),
    }
}

async fn search<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, Response>
where
    S: VectorStore + 'static,
    E: Embedder + 'static,
{
    let results = state
        .service
        .search(&body.question, body.policy_type.as_deref(), body.top_k_clamped())
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    Ok(Json(SearchResponse { results: results.iter().map(SourceItem::from).collect() }))
}

/// Build the application router. CORS is permissive: the service sits
/// behind a reverse proxy and the browser frontend runs on another port.
pub fn router<S, E>(state: Arc<AppState<S, E>>) -> Router
where
    S: VectorStore + 'static,
    E: Embedder + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::<S, E>))
        .route("/qa/ask", post(ask::<S, E>))
        .route("/qa/search", post(search::<S, E>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve<S, E>(addr: SocketAddr, state: Arc<AppState<S, E>>) -> anyhow::Result<()>
where
    S: VectorStore + 'static,
    E: Embedder + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "insura listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
