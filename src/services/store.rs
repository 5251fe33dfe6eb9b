//! Persistence seam for the order workflow.
//!
//! The workflow only talks to [`OrderStore`]; `MongoStore` backs it in
//! production and `MemoryStore` in tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{Actuary, Holding, Order, OrderFilter, OrderStatus, Security};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongo: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, id: ObjectId) -> StoreResult<Option<Order>>;
    async fn find_orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>>;
    async fn create_order(&self, order: &Order) -> StoreResult<ObjectId>;

    /// Compare-and-set on status: moves the order from `pending` to `status`
    /// and records the approver in the same write.
    ///
    /// Returns `None` when the order does not exist or is no longer pending.
    async fn transition_pending(
        &self,
        id: ObjectId,
        status: OrderStatus,
        approved_by: i64,
        modified_at: i64,
    ) -> StoreResult<Option<Order>>;

    async fn get_security(&self, id: i64) -> StoreResult<Option<Security>>;
    async fn get_holding(&self, user_id: i64, security_id: i64) -> StoreResult<Option<Holding>>;
    async fn get_actuary(&self, user_id: i64) -> StoreResult<Option<Actuary>>;

    async fn ping(&self) -> StoreResult<()>;
}
