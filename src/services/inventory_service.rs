use crate::{error::OrderError, models::Direction};

use super::store::OrderStore;

/// Can `quantity` units be bought (against security volume) or sold (against
/// the user's holding)? Only all-or-nothing orders are held to the full
/// quantity; partial fills are left to the matching engine.
///
/// Read-only. Nothing is reserved, so two approvals racing for the same
/// volume or holding can both pass.
pub async fn check_availability(
    store: &dyn OrderStore,
    direction: Direction,
    quantity: i64,
    aon: bool,
    security_id: i64,
    user_id: i64,
) -> Result<(), OrderError> {
    match direction {
        Direction::Buy => {
            let security = store
                .get_security(security_id)
                .await?
                .ok_or_else(|| OrderError::NotFound(format!("security {security_id}")))?;

            if aon && quantity > security.volume {
                tracing::warn!(security_id, quantity, volume = security.volume, "aon buy exceeds volume");
                return Err(OrderError::InsufficientInventory(format!(
                    "not enough units available ({} available, {} requested)",
                    security.volume, quantity
                )));
            }
        }
        Direction::Sell => {
            let holding = store.get_holding(user_id, security_id).await?.ok_or_else(|| {
                OrderError::NotFound(format!("security {security_id} is not in the portfolio of user {user_id}"))
            })?;

            if aon && holding.quantity < quantity {
                tracing::warn!(security_id, user_id, quantity, held = holding.quantity, "aon sell exceeds holding");
                return Err(OrderError::InsufficientInventory(format!(
                    "not enough units held for an AON sell (holding {}, requested {})",
                    holding.quantity, quantity
                )));
            }
        }
    }
    Ok(())
}
