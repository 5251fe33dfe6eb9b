use crate::models::OrderType;

/// Order type implied by which price fields are set.
pub fn classify(stop_price: Option<f64>, limit_price: Option<f64>) -> OrderType {
    match (stop_price.is_some(), limit_price.is_some()) {
        (false, false) => OrderType::Market,
        (false, true) => OrderType::Limit,
        (true, false) => OrderType::Stop,
        (true, true) => OrderType::StopLimit,
    }
}
