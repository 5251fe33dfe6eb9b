use crate::{
    config::WorkflowConfig,
    error::{MarginDenial, OrderError},
    models::{Capability, CurrentUser},
};

use super::{banking::LoanApprovals, store::OrderStore};

/// Maintenance rate and buffer applied to a security's last price.
#[derive(Debug, Clone, Copy)]
pub struct MarginPolicy {
    pub maintenance_rate: f64,
    pub buffer_rate: f64,
}

impl MarginPolicy {
    pub fn from_config(cfg: &WorkflowConfig) -> Self {
        Self {
            maintenance_rate: cfg.margin_maintenance_rate,
            buffer_rate: cfg.margin_buffer_rate,
        }
    }

    pub fn maintenance_margin(&self, last_price: f64) -> f64 {
        last_price * self.maintenance_rate
    }

    /// Rounded to cents so a limit equal to the quoted cost is accepted.
    pub fn initial_margin_cost(&self, last_price: f64) -> f64 {
        let cost = self.maintenance_margin(last_price) * (1.0 + self.buffer_rate);
        (cost * 100.0).round() / 100.0
    }
}

/// Decides whether `user_id` may finance an order on `security_id` with margin.
///
/// Agents and supervisors are checked against their actuary limit; everyone
/// else needs an approved loan from the banking service.
pub async fn authorize_margin(
    store: &dyn OrderStore,
    loans: &dyn LoanApprovals,
    policy: MarginPolicy,
    caller: &CurrentUser,
    user_id: i64,
    security_id: i64,
) -> Result<(), OrderError> {
    let security = store
        .get_security(security_id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("security {security_id}")))?;

    let initial_margin_cost = policy.initial_margin_cost(security.last_price);

    if caller.role().has(Capability::ActuaryMargin) {
        let Some(actuary) = store.get_actuary(user_id).await? else {
            tracing::warn!(user_id, "margin denied: no actuary profile");
            return Err(OrderError::MarginDenied(MarginDenial::NotMarginAccount));
        };

        if actuary.limit_amount < initial_margin_cost {
            tracing::warn!(
                user_id,
                limit = actuary.limit_amount,
                initial_margin_cost,
                "margin denied: limit too low"
            );
            return Err(OrderError::MarginDenied(MarginDenial::InsufficientLimit));
        }
        return Ok(());
    }

    if !loans.has_approved_loan(user_id, &caller.authorization).await? {
        tracing::warn!(user_id, "margin denied: no approved loan");
        return Err(OrderError::MarginDenied(MarginDenial::NoApprovedLoan));
    }
    Ok(())
}
