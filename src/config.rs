use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,

    // remote loan-approval service
    pub banking_service_url: String,
    pub banking_timeout_ms: u64,

    pub margin_maintenance_rate: f64,
    pub margin_buffer_rate: f64,
}

/// Knobs the order workflow is constructed with.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub remote_loan_service_base_url: String,
    pub margin_maintenance_rate: f64,
    pub margin_buffer_rate: f64,
    pub loan_request_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            remote_loan_service_base_url: "http://localhost:8082".to_string(),
            margin_maintenance_rate: 0.30,
            margin_buffer_rate: 0.10,
            loan_request_timeout: Duration::from_secs(5),
        }
    }
}

impl Settings {
    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            remote_loan_service_base_url: self.banking_service_url.clone(),
            margin_maintenance_rate: self.margin_maintenance_rate,
            margin_buffer_rate: self.margin_buffer_rate,
            loan_request_timeout: Duration::from_millis(self.banking_timeout_ms),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = WorkflowConfig::default();

    Settings {
        mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
        mongodb_db: var_or("MONGODB_DB", "tradedesk"),
        host: var_or("HOST", "127.0.0.1"),
        port: parsed_or("PORT", 3000),
        jwt_secret: var_or("JWT_SECRET", "change-me-dev-secret"),
        banking_service_url: var_or("BANKING_SERVICE", &defaults.remote_loan_service_base_url),
        banking_timeout_ms: parsed_or("BANKING_TIMEOUT_MS", 5_000),
        margin_maintenance_rate: parsed_or("MARGIN_MAINTENANCE_RATE", defaults.margin_maintenance_rate),
        margin_buffer_rate: parsed_or("MARGIN_BUFFER_RATE", defaults.margin_buffer_rate),
    }
}
