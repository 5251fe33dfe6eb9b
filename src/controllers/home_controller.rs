use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{error::OrderError, AppState};

pub async fn not_found() -> impl IntoResponse {
    OrderError::NotFound("no such route".to_string())
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.orders.store().ping().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true, "data": "store: ok" }))).into_response(),
        Err(e) => OrderError::Persistence(e).into_response(),
    }
}
