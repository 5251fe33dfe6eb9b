use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    // security id assigned by the market-data side
    #[serde(rename = "_id")]
    pub id: i64,

    #[serde(default)]
    pub ticker: String,

    // units currently available to buy
    pub volume: i64,
    pub last_price: f64,
}
