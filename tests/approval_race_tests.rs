mod common;

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::{mpsc::UnboundedReceiver, Barrier};
use tradedesk::{
    config::WorkflowConfig,
    error::OrderError,
    models::{Actuary, Direction, Holding, Order, OrderFilter, OrderStatus, Security},
    services::{
        matching::MatchingQueue,
        memory_store::MemoryStore,
        order_service::OrderWorkflow,
        store::{OrderStore, StoreResult},
    },
};

use common::{seed_pending, supervisor, LoanReply, ScriptedLoans};

/// Suspends every inventory lookup: on the barrier when one is set, otherwise
/// for a single scheduler turn.
struct GatedStore {
    inner: Arc<MemoryStore>,
    gate: Option<Barrier>,
    cas_calls: AtomicUsize,
    cas_won: AtomicUsize,
}

/// Behaves as if the order is deleted right before the status write.
struct VanishingStore {
    inner: Arc<MemoryStore>,
    gone: AtomicBool,
}

impl GatedStore {
    fn new(inner: Arc<MemoryStore>, gate: Option<Barrier>) -> Self {
        Self {
            inner,
            gate,
            cas_calls: AtomicUsize::new(0),
            cas_won: AtomicUsize::new(0),
        }
    }

    async fn suspend(&self) {
        match &self.gate {
            Some(barrier) => {
                barrier.wait().await;
            }
            None => tokio::task::yield_now().await,
        }
    }
}

#[async_trait]
impl OrderStore for GatedStore {
    async fn get_order(&self, id: ObjectId) -> StoreResult<Option<Order>> {
        self.inner.get_order(id).await
    }

    async fn find_orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        self.inner.find_orders(filter).await
    }

    async fn create_order(&self, order: &Order) -> StoreResult<ObjectId> {
        self.inner.create_order(order).await
    }

    async fn transition_pending(
        &self,
        id: ObjectId,
        status: OrderStatus,
        approved_by: i64,
        modified_at: i64,
    ) -> StoreResult<Option<Order>> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        let res = self.inner.transition_pending(id, status, approved_by, modified_at).await?;
        if res.is_some() {
            self.cas_won.fetch_add(1, Ordering::SeqCst);
        }
        Ok(res)
    }

    async fn get_security(&self, id: i64) -> StoreResult<Option<Security>> {
        let security = self.inner.get_security(id).await?;
        self.suspend().await;
        Ok(security)
    }

    async fn get_holding(&self, user_id: i64, security_id: i64) -> StoreResult<Option<Holding>> {
        let holding = self.inner.get_holding(user_id, security_id).await?;
        self.suspend().await;
        Ok(holding)
    }

    async fn get_actuary(&self, user_id: i64) -> StoreResult<Option<Actuary>> {
        self.inner.get_actuary(user_id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

#[async_trait]
impl OrderStore for VanishingStore {
    async fn get_order(&self, id: ObjectId) -> StoreResult<Option<Order>> {
        if self.gone.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get_order(id).await
    }

    async fn find_orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        self.inner.find_orders(filter).await
    }

    async fn create_order(&self, order: &Order) -> StoreResult<ObjectId> {
        self.inner.create_order(order).await
    }

    async fn transition_pending(
        &self,
        _id: ObjectId,
        _status: OrderStatus,
        _approved_by: i64,
        _modified_at: i64,
    ) -> StoreResult<Option<Order>> {
        self.gone.store(true, Ordering::SeqCst);
        Ok(None)
    }

    async fn get_security(&self, id: i64) -> StoreResult<Option<Security>> {
        self.inner.get_security(id).await
    }

    async fn get_holding(&self, user_id: i64, security_id: i64) -> StoreResult<Option<Holding>> {
        self.inner.get_holding(user_id, security_id).await
    }

    async fn get_actuary(&self, user_id: i64) -> StoreResult<Option<Actuary>> {
        self.inner.get_actuary(user_id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

fn workflow(store: Arc<dyn OrderStore>) -> (OrderWorkflow, UnboundedReceiver<Order>) {
    let (matcher, handoff) = MatchingQueue::channel();
    let workflow = OrderWorkflow::new(
        &WorkflowConfig::default(),
        store,
        Arc::new(ScriptedLoans::new(LoanReply::Approved)),
        Arc::new(matcher),
    );
    (workflow, handoff)
}

#[tokio::test]
async fn overlapping_approvals_write_once() {
    let inner = Arc::new(MemoryStore::new());
    inner.insert_security(7, 50, 10.0);
    let id = seed_pending(&inner, 1, 7, Direction::Buy, 5, true);

    let store = Arc::new(GatedStore::new(inner.clone(), Some(Barrier::new(2))));
    let (workflow, mut handoff) = workflow(store.clone());

    let (sup8, sup9) = (supervisor(8), supervisor(9));
    let (a, b) = tokio::join!(
        workflow.approve_order(&sup8, id),
        workflow.approve_order(&sup9, id),
    );

    assert_eq!(store.cas_calls.load(Ordering::SeqCst), 2, "both reached the status write");
    assert_eq!(store.cas_won.load(Ordering::SeqCst), 1);

    let (winner, loser) = match (a, b) {
        (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
        other => panic!("expected one success and one failure, got {other:?}"),
    };
    assert!(matches!(loser, OrderError::InvalidState(_)), "{loser:?}");

    let stored = inner.get_order(id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Approved);
    assert_eq!(stored.approved_by, winner.approved_by);

    assert_eq!(handoff.try_recv().unwrap().id, id);
    assert!(handoff.try_recv().is_err(), "matched exactly once");
}

#[tokio::test]
async fn overlapping_approve_and_decline_write_once() {
    let inner = Arc::new(MemoryStore::new());
    inner.insert_holding(1, 7, 20);
    let id = seed_pending(&inner, 1, 7, Direction::Sell, 5, true);

    // the approval passes the pending check, then the decline lands while it
    // is looking up the holding
    let store = Arc::new(GatedStore::new(inner.clone(), None));
    let (workflow, mut handoff) = workflow(store.clone());

    let (sup8, sup9) = (supervisor(8), supervisor(9));
    let (approved, declined) = tokio::join!(
        workflow.approve_order(&sup8, id),
        workflow.decline_order(&sup9, id),
    );

    assert_eq!(store.cas_calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.cas_won.load(Ordering::SeqCst), 1);
    assert_eq!(declined.unwrap().status, OrderStatus::Declined);
    let err = approved.unwrap_err();
    assert!(matches!(err, OrderError::InvalidState(_)), "{err:?}");
    assert!(handoff.try_recv().is_err());
}

#[tokio::test]
async fn order_removed_before_status_write_is_not_found() {
    let inner = Arc::new(MemoryStore::new());
    let id = seed_pending(&inner, 1, 7, Direction::Sell, 5, false);

    let store = Arc::new(VanishingStore {
        inner,
        gone: AtomicBool::new(false),
    });
    let (workflow, _handoff) = workflow(store);

    let err = workflow.decline_order(&supervisor(9), id).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn memory_store_transition_requires_pending() {
    let store = MemoryStore::new();
    let id = seed_pending(&store, 1, 7, Direction::Sell, 5, false);

    let first = store
        .transition_pending(id, OrderStatus::Declined, 9, 1)
        .await
        .unwrap()
        .expect("pending order transitions");
    assert_eq!(first.status, OrderStatus::Declined);
    assert_eq!(first.approved_by, Some(9));

    let second = store.transition_pending(id, OrderStatus::Approved, 8, 2).await.unwrap();
    assert!(second.is_none());

    let stored = store.get_order(id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Declined);
    assert_eq!(stored.approved_by, Some(9));
    assert_eq!(stored.last_modified, 1);

    let missing = store
        .transition_pending(ObjectId::new(), OrderStatus::Approved, 8, 3)
        .await
        .unwrap();
    assert!(missing.is_none());
}
