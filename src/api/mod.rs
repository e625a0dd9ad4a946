//! HTTP API for the swap form, status checks, and history

use crate::config::ApiConfig;
use crate::engine::SwapEngine;
use crate::error::{SwapError, SwapResult};
use crate::ledger::TransactionRecord;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SwapEngine>,
}

/// Run the HTTP API server
pub async fn run_server(config: ApiConfig, engine: Arc<SwapEngine>) -> SwapResult<()> {
    let state = AppState { engine };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/amount", post(set_amount))
        .route("/price", post(set_price))
        .route("/swap", post(execute_swap))
        .route("/swaps", get(get_swaps))
        .route("/status/:hash", get(get_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();

    Ok(())
}

/// Health check endpoint - basic liveness
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Edit the amount field; invalid input is ignored, not rejected
async fn set_amount(
    State(state): State<AppState>,
    Json(update): Json<FieldUpdate>,
) -> impl IntoResponse {
    let (amount, price) = state.engine.set_amount(&update.value).await;
    Json(FieldResponse { amount, price })
}

/// Edit the price field; the raw text also becomes the destination
async fn set_price(
    State(state): State<AppState>,
    Json(update): Json<FieldUpdate>,
) -> impl IntoResponse {
    let (amount, price) = state.engine.set_price(&update.value).await;
    Json(FieldResponse { amount, price })
}

/// Run a swap against the current form state
async fn execute_swap(State(state): State<AppState>) -> Response {
    match state.engine.swap().await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// Full swap history, oldest first
async fn get_swaps(State(state): State<AppState>) -> impl IntoResponse {
    Json(SwapsResponse {
        swaps: state.engine.history().await,
    })
}

/// Resolve a transaction hash to its observed state
///
/// A resolver failure surfaces as "unknown" rather than an error; the
/// hash may still settle later and the caller is free to ask again.
async fn get_status(State(state): State<AppState>, Path(hash): Path<String>) -> impl IntoResponse {
    let status = match state.engine.check_status(&hash).await {
        Ok(status) => status.as_str().to_string(),
        Err(_) => "unknown".to_string(),
    };

    Json(HashStatusResponse { hash, status })
}

fn error_response(e: &SwapError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        SwapError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SwapError::WalletUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SwapError::Transfer(_) | SwapError::RetryExhausted { .. } => StatusCode::BAD_GATEWAY,
        SwapError::Config(_) | SwapError::Persistence(_) | SwapError::Status(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            retryable: e.is_retryable(),
        }),
    )
}

// Request and response types

#[derive(Deserialize)]
struct FieldUpdate {
    value: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct FieldResponse {
    amount: f64,
    price: f64,
}

#[derive(Serialize)]
struct SwapsResponse {
    swaps: Vec<TransactionRecord>,
}

#[derive(Serialize)]
struct HashStatusResponse {
    hash: String,
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    retryable: bool,
}
