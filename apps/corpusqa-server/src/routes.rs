//! HTTP routes.
//!
//! Both endpoints answer in every lifecycle state: during indexing and after
//! a failed startup, queries get a structured error instead of a connection
//! refusal, and the health endpoint reports what is going on.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::{AppState, ServingState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        // Permissive CORS: the query surface is unauthenticated and meant to
        // be called from a local frontend on another port.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_reply(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({ "error": message, "status": "error" }))).into_response()
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let question = request.question.trim();
    if question.is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, "question must not be empty");
    }

    let engine = match state.snapshot() {
        ServingState::Ready(engine) => engine,
        ServingState::Uninitialized | ServingState::Indexing => {
            return error_reply(
                StatusCode::SERVICE_UNAVAILABLE,
                "server is still starting up, try again shortly",
            );
        }
        ServingState::Failed(reason) => {
            return error_reply(StatusCode::SERVICE_UNAVAILABLE, &reason);
        }
    };

    match engine.answer(request.session_id.as_deref(), question).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(json!({
                "answer": reply.answer,
                "status": "ok",
                "sources": reply.sources,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            error_reply(StatusCode::BAD_GATEWAY, &e.to_string())
        }
    }
}

async fn health(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot();
    let (status, error) = match &snapshot {
        ServingState::Ready(_) => ("ok", None),
        ServingState::Failed(reason) => ("error", Some(reason.clone())),
        ServingState::Uninitialized | ServingState::Indexing => ("starting", None),
    };
    Json(json!({
        "status": status,
        "state": snapshot.label(),
        "error": error,
        "model": state.chat_model(),
    }))
    .into_response()
}
