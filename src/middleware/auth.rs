use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::OrderError,
    models::{Capability, CurrentUser},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id as decimal string
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

pub fn make_jwt(secret: &str, user_id: i64, department: Option<&str>, ttl_minutes: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        department: department.map(str::to_string),
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<(&str, &str)> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    Some((raw, token))
}

/// Resolves the caller from a bearer JWT, if one is present and valid.
pub fn current_user_from_headers(secret: &str, headers: &HeaderMap) -> Option<CurrentUser> {
    let (raw, token) = bearer_token(headers)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()?;

    let id = data.claims.sub.parse::<i64>().ok()?;
    Some(CurrentUser {
        id,
        department: data.claims.department,
        authorization: raw.to_string(),
    })
}

pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = current_user_from_headers(&state.settings.jwt_secret, req.headers()) {
        // Store user in request extensions so handlers can access it
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/health" || path == "/health/db"
}

pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    // inject_current_user already ran
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    OrderError::Unauthorized("missing or invalid bearer token".to_string()).into_response()
}

pub async fn require_supervisor(req: Request<axum::body::Body>, next: Next) -> Response {
    let allowed = req
        .extensions()
        .get::<CurrentUser>()
        .map(|u| u.role().has(Capability::AuthorizeOrders))
        .unwrap_or(false);

    if !allowed {
        return OrderError::Forbidden("supervisor role required".to_string()).into_response();
    }

    next.run(req).await
}
