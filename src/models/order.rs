use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Accepts `buy` / `sell` in any letter case.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("buy") {
            Some(Direction::Buy)
        } else if raw.eq_ignore_ascii_case("sell") {
            Some(Direction::Sell)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "MARKET")]
    Market,
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "STOP")]
    Stop,
    #[serde(rename = "STOP-LIMIT")]
    StopLimit,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Stop => "STOP",
            OrderType::StopLimit => "STOP-LIMIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Declined,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "approved" => Some(OrderStatus::Approved),
            "declined" => Some(OrderStatus::Declined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: i64,
    pub account_id: i64,
    pub security_id: i64,

    pub quantity: i64,
    pub contract_size: i64,
    #[serde(default)]
    pub stop_price_per_unit: Option<f64>,
    #[serde(default)]
    pub limit_price_per_unit: Option<f64>,
    pub order_type: OrderType,
    pub direction: Direction,

    pub status: OrderStatus,
    // None until a supervisor approves or declines
    #[serde(default)]
    pub approved_by: Option<i64>,
    pub is_done: bool,
    pub remaining_parts: i64,
    pub last_modified: i64,

    pub after_hours: bool,
    pub aon: bool,
    pub margin: bool,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "securityID")]
    pub security_id: i64,
    pub quantity: i64,
    #[serde(rename = "contractSize")]
    pub contract_size: i64,
    #[serde(rename = "stopPricePerUnit", default)]
    pub stop_price_per_unit: Option<f64>,
    #[serde(rename = "limitPricePerUnit", default)]
    pub limit_price_per_unit: Option<f64>,
    pub direction: String,
    #[serde(rename = "AON", default)]
    pub aon: bool,
    #[serde(default)]
    pub margin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "securityID")]
    pub security_id: i64,
    pub quantity: i64,
    #[serde(rename = "contractSize")]
    pub contract_size: i64,
    #[serde(rename = "stopPricePerUnit")]
    pub stop_price_per_unit: Option<f64>,
    #[serde(rename = "limitPricePerUnit")]
    pub limit_price_per_unit: Option<f64>,
    #[serde(rename = "orderType")]
    pub order_type: OrderType,
    pub direction: Direction,
    pub status: OrderStatus,
    #[serde(rename = "approvedBy")]
    pub approved_by: Option<i64>,
    #[serde(rename = "isDone")]
    pub is_done: bool,
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    #[serde(rename = "remainingParts")]
    pub remaining_parts: i64,
    #[serde(rename = "afterHours")]
    pub after_hours: bool,
    #[serde(rename = "AON")]
    pub aon: bool,
    pub margin: bool,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id.to_hex(),
            user_id: o.user_id,
            account_id: o.account_id,
            security_id: o.security_id,
            quantity: o.quantity,
            contract_size: o.contract_size,
            stop_price_per_unit: o.stop_price_per_unit,
            limit_price_per_unit: o.limit_price_per_unit,
            order_type: o.order_type,
            direction: o.direction,
            status: o.status,
            approved_by: o.approved_by,
            is_done: o.is_done,
            last_modified: o.last_modified,
            remaining_parts: o.remaining_parts,
            after_hours: o.after_hours,
            aon: o.aon,
            margin: o.margin,
        }
    }
}

/// Status filter for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Status(OrderStatus),
}

impl OrderFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Some(OrderFilter::All);
        }
        OrderStatus::parse(raw).map(OrderFilter::Status)
    }

    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::Status(s) => order.status == *s,
        }
    }
}
