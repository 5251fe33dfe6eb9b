#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::mpsc::UnboundedReceiver;
use tradedesk::{
    config::{self, WorkflowConfig},
    error::OrderError,
    models::{CreateOrderRequest, CurrentUser, Direction, Order, OrderStatus, OrderType},
    services::{
        banking::LoanApprovals,
        matching::MatchingQueue,
        memory_store::MemoryStore,
        order_service::OrderWorkflow,
    },
    AppState,
};

pub const JWT_SECRET: &str = "test-secret";

#[derive(Debug, Clone, Copy)]
pub enum LoanReply {
    Approved,
    Refused,
    Unavailable,
    Malformed,
}

/// Banking service stand-in that answers with a fixed reply.
pub struct ScriptedLoans {
    reply: Mutex<LoanReply>,
    calls: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

impl ScriptedLoans {
    pub fn new(reply: LoanReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoanApprovals for ScriptedLoans {
    async fn has_approved_loan(&self, _user_id: i64, authorization: &str) -> Result<bool, OrderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_authorization.lock().unwrap() = Some(authorization.to_string());

        match *self.reply.lock().unwrap() {
            LoanReply::Approved => Ok(true),
            LoanReply::Refused => Ok(false),
            LoanReply::Unavailable => Err(OrderError::UpstreamUnavailable("banking service returned 500".into())),
            LoanReply::Malformed => Err(OrderError::UpstreamMalformed("missing approvedLoan".into())),
        }
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub loans: Arc<ScriptedLoans>,
    pub handoff: UnboundedReceiver<Order>,
    pub workflow: Arc<OrderWorkflow>,
}

pub fn harness(reply: LoanReply) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let loans = Arc::new(ScriptedLoans::new(reply));
    let (matcher, handoff) = MatchingQueue::channel();

    let workflow = Arc::new(OrderWorkflow::new(
        &WorkflowConfig::default(),
        store.clone(),
        loans.clone(),
        Arc::new(matcher),
    ));

    Harness { store, loans, handoff, workflow }
}

pub fn app_state(h: &Harness) -> AppState {
    let mut settings = config::load();
    settings.jwt_secret = JWT_SECRET.to_string();

    AppState {
        settings,
        orders: h.workflow.clone(),
    }
}

pub fn client(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        department: None,
        authorization: format!("Bearer client-{id}"),
    }
}

pub fn agent(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        department: Some("AGENT".to_string()),
        authorization: format!("Bearer agent-{id}"),
    }
}

pub fn supervisor(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        department: Some("SUPERVISOR".to_string()),
        authorization: format!("Bearer supervisor-{id}"),
    }
}

pub fn market_request(user_id: i64, security_id: i64, direction: &str, quantity: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id,
        account_id: 100 + user_id,
        security_id,
        quantity,
        contract_size: 1,
        stop_price_per_unit: None,
        limit_price_per_unit: None,
        direction: direction.to_string(),
        aon: false,
        margin: false,
    }
}

/// A pending order stored directly, as if a client had created it earlier.
pub fn seed_pending(store: &MemoryStore, user_id: i64, security_id: i64, direction: Direction, quantity: i64, aon: bool) -> ObjectId {
    let order = Order {
        id: ObjectId::new(),
        user_id,
        account_id: 100 + user_id,
        security_id,
        quantity,
        contract_size: 1,
        stop_price_per_unit: None,
        limit_price_per_unit: None,
        order_type: OrderType::Market,
        direction,
        status: OrderStatus::Pending,
        approved_by: None,
        is_done: false,
        remaining_parts: quantity,
        last_modified: 0,
        after_hours: false,
        aon,
        margin: false,
    };
    let id = order.id;
    store.insert_order(order);
    id
}
