use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;

use crate::error::OrderError;

/// Remote check for an approved bank loan, used to gate client margin orders.
#[async_trait]
pub trait LoanApprovals: Send + Sync {
    /// `authorization` is the caller's raw `Authorization` header.
    async fn has_approved_loan(&self, user_id: i64, authorization: &str) -> Result<bool, OrderError>;
}

#[derive(Clone)]
pub struct BankingClient {
    http: Client,
    base_url: String,
}

impl BankingClient {
    /// Requests are single-attempt and bounded by `timeout`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn loan_url(&self, user_id: i64) -> String {
        format!("{}/loans/has-approved-loan/{}", self.base_url, user_id)
    }
}

#[derive(Debug, Deserialize)]
struct LoanApprovalResponse {
    #[serde(rename = "approvedLoan")]
    approved_loan: bool,
}

#[async_trait]
impl LoanApprovals for BankingClient {
    async fn has_approved_loan(&self, user_id: i64, authorization: &str) -> Result<bool, OrderError> {
        let res = self
            .http
            .get(self.loan_url(user_id))
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(kind = "upstream_unavailable", user_id, error = %e, "banking service request failed");
                OrderError::UpstreamUnavailable(format!("banking service: {e}"))
            })?;

        if res.status() != reqwest::StatusCode::OK {
            let status = res.status();
            tracing::error!(kind = "upstream_unavailable", user_id, %status, "banking service returned non-success status");
            return Err(OrderError::UpstreamUnavailable(format!(
                "banking service returned {status}"
            )));
        }

        let body = res.text().await.map_err(|e| {
            tracing::error!(kind = "upstream_unavailable", user_id, error = %e, "banking service body read failed");
            OrderError::UpstreamUnavailable(format!("banking service: {e}"))
        })?;

        let parsed: LoanApprovalResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(kind = "upstream_malformed", user_id, error = %e, "banking service response did not parse");
            OrderError::UpstreamMalformed(format!("banking service response: {e}"))
        })?;

        Ok(parsed.approved_loan)
    }
}
