use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;

use crate::models::{Actuary, Holding, Order, OrderFilter, OrderStatus, Security};

use super::store::{OrderStore, StoreResult};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for MongoStore {
    async fn get_order(&self, id: ObjectId) -> StoreResult<Option<Order>> {
        let orders = self.db.collection::<Order>("orders");
        Ok(orders.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        let orders = self.db.collection::<Order>("orders");
        let query: Document = match filter {
            OrderFilter::All => doc! {},
            OrderFilter::Status(s) => doc! { "status": s.as_str() },
        };
        let find_opts = FindOptions::builder().sort(doc! { "last_modified": -1 }).build();

        let mut cursor = orders.find(query, find_opts).await?;

        let mut out: Vec<Order> = vec![];
        while let Some(res) = cursor.next().await {
            out.push(res?);
        }
        Ok(out)
    }

    async fn create_order(&self, order: &Order) -> StoreResult<ObjectId> {
        let orders = self.db.collection::<Order>("orders");
        orders.insert_one(order, None).await?;
        Ok(order.id)
    }

    async fn transition_pending(
        &self,
        id: ObjectId,
        status: OrderStatus,
        approved_by: i64,
        modified_at: i64,
    ) -> StoreResult<Option<Order>> {
        let orders = self.db.collection::<Order>("orders");
        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        // the status filter makes this a single atomic compare-and-set
        let updated = orders
            .find_one_and_update(
                doc! { "_id": id, "status": OrderStatus::Pending.as_str() },
                doc! {
                    "$set": {
                        "status": status.as_str(),
                        "approved_by": approved_by,
                        "last_modified": modified_at,
                    }
                },
                opts,
            )
            .await?;
        Ok(updated)
    }

    async fn get_security(&self, id: i64) -> StoreResult<Option<Security>> {
        let securities = self.db.collection::<Security>("securities");
        Ok(securities.find_one(doc! { "_id": id }, None).await?)
    }

    async fn get_holding(&self, user_id: i64, security_id: i64) -> StoreResult<Option<Holding>> {
        let portfolios = self.db.collection::<Holding>("portfolios");
        Ok(portfolios
            .find_one(doc! { "user_id": user_id, "security_id": security_id }, None)
            .await?)
    }

    async fn get_actuary(&self, user_id: i64) -> StoreResult<Option<Actuary>> {
        let actuaries = self.db.collection::<Actuary>("actuaries");
        Ok(actuaries.find_one(doc! { "user_id": user_id }, None).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
