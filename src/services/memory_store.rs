use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Actuary, Holding, Order, OrderFilter, OrderStatus, Security};

use super::store::{OrderStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    securities: Vec<Security>,
    holdings: Vec<Holding>,
    actuaries: Vec<Actuary>,
}

/// In-process store with the same compare-and-set semantics as `MongoStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    // seeding helpers keep going on a poisoned lock
    fn seed(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    /// Makes every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_security(&self, id: i64, volume: i64, last_price: f64) {
        let mut t = self.seed();
        t.securities.retain(|s| s.id != id);
        t.securities.push(Security {
            id,
            ticker: String::new(),
            volume,
            last_price,
        });
    }

    pub fn insert_holding(&self, user_id: i64, security_id: i64, quantity: i64) {
        let mut t = self.seed();
        t.holdings
            .retain(|h| !(h.user_id == user_id && h.security_id == security_id));
        t.holdings.push(Holding {
            id: ObjectId::new(),
            user_id,
            security_id,
            quantity,
        });
    }

    pub fn insert_actuary(&self, user_id: i64, limit_amount: f64) {
        let mut t = self.seed();
        t.actuaries.retain(|a| a.user_id != user_id);
        t.actuaries.push(Actuary {
            id: ObjectId::new(),
            user_id,
            limit_amount,
        });
    }

    /// Inserts an already-built order, bypassing the workflow.
    pub fn insert_order(&self, order: Order) {
        self.seed().orders.push(order);
    }

    pub fn order_count(&self) -> usize {
        self.seed().orders.len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn get_order(&self, id: ObjectId) -> StoreResult<Option<Order>> {
        let t = self.lock()?;
        Ok(t.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        let t = self.lock()?;
        Ok(t.orders.iter().filter(|o| filter.matches(o)).cloned().collect())
    }

    async fn create_order(&self, order: &Order) -> StoreResult<ObjectId> {
        self.check_writable()?;
        let mut t = self.lock()?;
        t.orders.push(order.clone());
        Ok(order.id)
    }

    async fn transition_pending(
        &self,
        id: ObjectId,
        status: OrderStatus,
        approved_by: i64,
        modified_at: i64,
    ) -> StoreResult<Option<Order>> {
        self.check_writable()?;
        let mut t = self.lock()?;
        let Some(order) = t
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Pending)
        else {
            return Ok(None);
        };

        order.status = status;
        order.approved_by = Some(approved_by);
        order.last_modified = modified_at;
        Ok(Some(order.clone()))
    }

    async fn get_security(&self, id: i64) -> StoreResult<Option<Security>> {
        let t = self.lock()?;
        Ok(t.securities.iter().find(|s| s.id == id).cloned())
    }

    async fn get_holding(&self, user_id: i64, security_id: i64) -> StoreResult<Option<Holding>> {
        let t = self.lock()?;
        Ok(t.holdings
            .iter()
            .find(|h| h.user_id == user_id && h.security_id == security_id)
            .cloned())
    }

    async fn get_actuary(&self, user_id: i64) -> StoreResult<Option<Actuary>> {
        let t = self.lock()?;
        Ok(t.actuaries.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_survives_a_poisoned_lock() {
        let store = MemoryStore::new();

        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.tables.lock().unwrap();
                panic!("poison the store");
            })
            .join()
        });
        assert!(store.tables.is_poisoned());

        store.insert_security(7, 50, 10.0);
        store.insert_holding(1, 7, 5);
        store.insert_actuary(1, 100.0);

        let t = store.seed();
        assert_eq!(t.securities.len(), 1);
        assert_eq!(t.holdings.len(), 1);
        assert_eq!(t.actuaries.len(), 1);
    }
}
