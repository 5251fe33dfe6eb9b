use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One portfolio row: how many units of a security a user holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: i64,
    pub security_id: i64,
    pub quantity: i64,
}
