//! Library entrypoint for TradeDesk.
//!
//! Integration tests under `tests/` build the app state, routers, and the
//! order workflow from here.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub orders: Arc<services::order_service::OrderWorkflow>,
}
