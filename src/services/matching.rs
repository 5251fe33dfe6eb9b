use tokio::sync::mpsc;

use crate::models::Order;

/// Handoff point to the external matching engine.
pub trait MatchingEngine: Send + Sync {
    /// Fire-and-forget; failures after this point never reach the workflow.
    fn match_order(&self, order: Order);
}

#[derive(Clone)]
pub struct MatchingQueue {
    tx: mpsc::UnboundedSender<Order>,
}

impl MatchingQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Order>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MatchingEngine for MatchingQueue {
    fn match_order(&self, order: Order) {
        let id = order.id.to_hex();
        if self.tx.send(order).is_err() {
            tracing::warn!(order_id = %id, "matching queue closed, order not handed off");
        }
    }
}

/// Drains the queue until every sender is gone.
pub async fn run_handoff(mut rx: mpsc::UnboundedReceiver<Order>) {
    while let Some(order) = rx.recv().await {
        tracing::info!(
            order_id = %order.id.to_hex(),
            security_id = order.security_id,
            direction = order.direction.as_str(),
            quantity = order.remaining_parts,
            "order handed to matching engine"
        );
    }
    tracing::info!("matching queue closed");
}
