use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Internal margin credit profile for agents and supervisors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actuary {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: i64,
    // total approved margin credit
    pub limit_amount: f64,
}
