use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::OrderError,
    models::{CreateOrderRequest, CurrentUser, OrderFilter, OrderView},
    AppState,
};

fn require_user(user: Option<Extension<CurrentUser>>) -> Result<CurrentUser, OrderError> {
    user.map(|Extension(u)| u)
        .ok_or_else(|| OrderError::Unauthorized("missing or invalid bearer token".to_string()))
}

fn parse_order_id(raw: &str) -> Result<ObjectId, OrderError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| OrderError::validation("id", "invalid order id"))
}

fn ok(status: StatusCode, data: serde_json::Value) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Response, OrderError> {
    require_user(user)?;
    let id = parse_order_id(&id)?;

    let order = state.orders.get_order(id).await?;
    Ok(ok(StatusCode::OK, json!(OrderView::from(&order))))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub filter_status: Option<String>,
}

// GET /orders?filter_status=pending
pub async fn list_orders(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Response, OrderError> {
    require_user(user)?;

    let raw = q.filter_status.unwrap_or_else(|| "all".to_string());
    let filter = OrderFilter::parse(&raw).ok_or_else(|| {
        OrderError::validation("filter_status", "must be one of all, pending, approved, declined")
    })?;

    let orders = state.orders.list_orders(filter).await?;
    let views: Vec<OrderView> = orders.iter().map(OrderView::from).collect();
    Ok(ok(StatusCode::OK, json!(views)))
}

// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response, OrderError> {
    let caller = require_user(user)?;
    let Json(req) = body.map_err(|e| OrderError::validation("_body", &e.body_text()))?;

    let id = state.orders.create_order(&caller, req).await?;
    Ok(ok(StatusCode::CREATED, json!(id.to_hex())))
}

// POST /orders/:id/approve
pub async fn approve_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Response, OrderError> {
    let approver = require_user(user)?;
    let id = parse_order_id(&id)?;

    let order = state.orders.approve_order(&approver, id).await?;
    Ok(ok(StatusCode::OK, json!(order.id.to_hex())))
}

// POST /orders/:id/decline
pub async fn decline_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Response, OrderError> {
    let approver = require_user(user)?;
    let id = parse_order_id(&id)?;

    let order = state.orders.decline_order(&approver, id).await?;
    Ok(ok(StatusCode::OK, json!(order.id.to_hex())))
}
