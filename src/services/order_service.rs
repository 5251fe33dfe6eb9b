//! Order lifecycle: creation with its initial status, and the one-shot
//! pending -> approved / declined transition.

use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::{
    config::WorkflowConfig,
    error::{FieldErrors, OrderError},
    models::{Capability, CreateOrderRequest, CurrentUser, Direction, Order, OrderFilter, OrderStatus},
};

use super::{
    banking::LoanApprovals,
    inventory_service,
    margin_service::{self, MarginPolicy},
    matching::MatchingEngine,
    order_classifier,
    store::OrderStore,
};

pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    loans: Arc<dyn LoanApprovals>,
    matcher: Arc<dyn MatchingEngine>,
    margin: MarginPolicy,
}

fn validate(req: &CreateOrderRequest) -> Result<Direction, OrderError> {
    let mut errs = FieldErrors::new();

    let positive = [
        ("userID", req.user_id),
        ("accountID", req.account_id),
        ("securityID", req.security_id),
        ("quantity", req.quantity),
        ("contractSize", req.contract_size),
    ];
    for (field, value) in positive {
        if value <= 0 {
            errs.insert(field.into(), "must be greater than zero".into());
        }
    }

    let prices = [
        ("stopPricePerUnit", req.stop_price_per_unit),
        ("limitPricePerUnit", req.limit_price_per_unit),
    ];
    for (field, value) in prices {
        if let Some(p) = value {
            if !p.is_finite() || p <= 0.0 {
                errs.insert(field.into(), "must be a positive price".into());
            }
        }
    }

    let direction = Direction::parse(&req.direction);
    if direction.is_none() {
        errs.insert("direction".into(), "must be 'buy' or 'sell'".into());
    }

    match direction {
        Some(d) if errs.is_empty() => Ok(d),
        _ => Err(OrderError::Validation(errs)),
    }
}

impl OrderWorkflow {
    pub fn new(
        config: &WorkflowConfig,
        store: Arc<dyn OrderStore>,
        loans: Arc<dyn LoanApprovals>,
        matcher: Arc<dyn MatchingEngine>,
    ) -> Self {
        Self {
            store,
            loans,
            matcher,
            margin: MarginPolicy::from_config(config),
        }
    }

    pub fn store(&self) -> &dyn OrderStore {
        self.store.as_ref()
    }

    /// Creates an order and returns its id.
    ///
    /// Every check runs before the single insert, so a rejected request never
    /// leaves a row behind.
    pub async fn create_order(
        &self,
        caller: &CurrentUser,
        req: CreateOrderRequest,
    ) -> Result<ObjectId, OrderError> {
        let direction = validate(&req)?;
        let role = caller.role();

        if caller.id != req.user_id && !role.has(Capability::CreateOnBehalf) {
            return Err(OrderError::Forbidden(
                "cannot create order for another user".to_string(),
            ));
        }

        let (status, approved_by) = if role.has(Capability::SelfApprove) {
            (OrderStatus::Approved, Some(caller.id))
        } else {
            (OrderStatus::Pending, None)
        };

        if status == OrderStatus::Approved {
            inventory_service::check_availability(
                self.store(),
                direction,
                req.quantity,
                req.aon,
                req.security_id,
                req.user_id,
            )
            .await?;
        }

        let order_type = order_classifier::classify(req.stop_price_per_unit, req.limit_price_per_unit);

        if req.margin {
            margin_service::authorize_margin(
                self.store(),
                self.loans.as_ref(),
                self.margin,
                caller,
                req.user_id,
                req.security_id,
            )
            .await?;
        }

        let order = Order {
            id: ObjectId::new(),
            user_id: req.user_id,
            account_id: req.account_id,
            security_id: req.security_id,
            quantity: req.quantity,
            contract_size: req.contract_size,
            stop_price_per_unit: req.stop_price_per_unit,
            limit_price_per_unit: req.limit_price_per_unit,
            order_type,
            direction,
            status,
            approved_by,
            is_done: false,
            remaining_parts: req.quantity,
            last_modified: Utc::now().timestamp(),
            after_hours: false,
            aon: req.aon,
            margin: req.margin,
        };

        let id = self.store.create_order(&order).await?;

        tracing::info!(
            order_id = %id.to_hex(),
            user_id = order.user_id,
            order_type = order.order_type.as_str(),
            status = %order.status,
            "order created"
        );

        if order.status == OrderStatus::Approved {
            self.matcher.match_order(order);
        }

        Ok(id)
    }

    pub async fn get_order(&self, id: ObjectId) -> Result<Order, OrderError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("order {}", id.to_hex())))
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.find_orders(filter).await?)
    }

    async fn load_pending(&self, id: ObjectId) -> Result<Order, OrderError> {
        let order = self.get_order(id).await?;
        if order.status != OrderStatus::Pending {
            return Err(not_pending(&order));
        }
        Ok(order)
    }

    async fn transition(
        &self,
        id: ObjectId,
        status: OrderStatus,
        approver: &CurrentUser,
    ) -> Result<Order, OrderError> {
        let now = Utc::now().timestamp();
        match self.store.transition_pending(id, status, approver.id, now).await? {
            Some(order) => Ok(order),
            // lost a race with another approve/decline, or the order vanished
            None => Err(match self.store.get_order(id).await? {
                Some(current) => not_pending(&current),
                None => OrderError::NotFound(format!("order {}", id.to_hex())),
            }),
        }
    }

    /// Checks inventory against the order's recorded terms, approves it and
    /// hands it to the matching engine. A failed check leaves it pending.
    pub async fn approve_order(&self, approver: &CurrentUser, id: ObjectId) -> Result<Order, OrderError> {
        let order = self.load_pending(id).await?;

        inventory_service::check_availability(
            self.store(),
            order.direction,
            order.quantity,
            order.aon,
            order.security_id,
            order.user_id,
        )
        .await?;

        let approved = self.transition(id, OrderStatus::Approved, approver).await?;
        tracing::info!(order_id = %id.to_hex(), approved_by = approver.id, "order approved");

        self.matcher.match_order(approved.clone());
        Ok(approved)
    }

    pub async fn decline_order(&self, approver: &CurrentUser, id: ObjectId) -> Result<Order, OrderError> {
        self.load_pending(id).await?;

        let declined = self.transition(id, OrderStatus::Declined, approver).await?;
        tracing::info!(order_id = %id.to_hex(), declined_by = approver.id, "order declined");
        Ok(declined)
    }
}

fn not_pending(order: &Order) -> OrderError {
    OrderError::InvalidState(format!(
        "order {} is not pending (status: {})",
        order.id.to_hex(),
        order.status
    ))
}
