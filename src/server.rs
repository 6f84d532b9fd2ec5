//! HTTP query service.
//!
//! Builds the engine once at startup and serves it behind a small JSON API.
//! Refusals are well-formed 200 responses — they are expected outcomes of
//! the decision policy, not errors; only transport and readiness problems
//! surface as HTTP errors.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ask` | Answer a question against the knowledge base |
//! | `GET`  | `/health` | Liveness probe |
//!
//! # Error Contract
//!
//! Error responses carry a machine-readable code and a human-readable
//! message:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_ready` (503), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use docent_core::engine::RetrievalEngine;
use docent_core::error::EngineError;
use docent_core::models::Decision;

use crate::bootstrap;
use crate::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    engine: Arc<RetrievalEngine>,
}

/// Starts the HTTP query server.
///
/// Loads and indexes the knowledge base first, then binds to the address
/// configured in `[server].bind` and serves until the process terminates.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let engine = Arc::new(bootstrap::build_engine(config).await?);
    let state = AppState { engine };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    let bind_addr = &config.server.bind;
    println!("docent listening on http://{}", bind_addr);
    tracing::info!("serving queries on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 503 Service Unavailable error.
fn not_ready(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "not_ready".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 Internal Server Error.
fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ Handlers ============

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    #[serde(flatten)]
    decision: Decision,
    latency_seconds: f64,
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let start = Instant::now();
    match state.engine.ask(&request.question).await {
        Ok(decision) => {
            let latency_seconds = (start.elapsed().as_secs_f64() * 10_000.0).round() / 10_000.0;
            Ok(Json(AskResponse {
                decision,
                latency_seconds,
            }))
        }
        Err(EngineError::NotReady) => Err(not_ready("the index is not built yet")),
        Err(e) => Err(internal(e.to_string())),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::models::{Answer, RefusalReason};

    #[test]
    fn test_ask_response_flattens_decision() {
        let response = AskResponse {
            decision: Decision::Answer(Answer {
                answer: "CUPS: classification".to_string(),
                source: "definiciones.md".to_string(),
                confidence: 0.9,
            }),
            latency_seconds: 0.0123,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["answer"], "CUPS: classification");
        assert_eq!(json["latency_seconds"], 0.0123);
    }

    #[test]
    fn test_refusal_response_shape() {
        let response = AskResponse {
            decision: Decision::refusal(RefusalReason::OutOfDomain),
            latency_seconds: 0.001,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["refused"], true);
        assert_eq!(json["reason"], "out_of_domain");
    }
}
