use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::store::StoreError;

/// Field name -> message. Ordered so error output is stable.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginDenial {
    /// No actuary profile for the user.
    NotMarginAccount,
    /// Actuary limit below the initial margin cost.
    InsufficientLimit,
    /// Bank reports no approved loan.
    NoApprovedLoan,
}

impl std::fmt::Display for MarginDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MarginDenial::NotMarginAccount => "not a registered margin account",
            MarginDenial::InsufficientLimit => "margin limit too low for this order",
            MarginDenial::NoApprovedLoan => "not authorized for margin (no approved loan)",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(FieldErrors),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("insufficient inventory: {0}")]
    InsufficientInventory(String),

    #[error("margin denied: {0}")]
    MarginDenied(MarginDenial),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed upstream response: {0}")]
    UpstreamMalformed(String),

    // driver detail stays in the logs, see `into_response`
    #[error("storage failure")]
    Persistence(#[from] StoreError),
}

fn join_fields(errs: &FieldErrors) -> String {
    errs.iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl OrderError {
    pub fn validation(field: &str, msg: &str) -> Self {
        let mut errs = FieldErrors::new();
        errs.insert(field.to_string(), msg.to_string());
        OrderError::Validation(errs)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            OrderError::Validation(_)
            | OrderError::InvalidState(_)
            | OrderError::InsufficientInventory(_) => StatusCode::BAD_REQUEST,
            OrderError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            OrderError::Forbidden(_) | OrderError::MarginDenied(_) => StatusCode::FORBIDDEN,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::UpstreamUnavailable(_)
            | OrderError::UpstreamMalformed(_)
            | OrderError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "VALIDATION_ERROR",
            OrderError::Unauthorized(_) => "UNAUTHORIZED",
            OrderError::Forbidden(_) => "FORBIDDEN",
            OrderError::NotFound(_) => "NOT_FOUND",
            OrderError::InvalidState(_) => "INVALID_STATE",
            OrderError::InsufficientInventory(_) => "INSUFFICIENT_INVENTORY",
            OrderError::MarginDenied(_) => "MARGIN_DENIED",
            OrderError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            OrderError::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
            OrderError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let OrderError::Persistence(detail) = &self {
            tracing::error!(code = self.code(), detail = %detail, "request failed");
        } else if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        if let OrderError::Validation(fields) = &self {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}
