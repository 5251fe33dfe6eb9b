pub mod user;
pub mod order;
pub mod security;
pub mod holding;
pub mod actuary;

pub use user::{Capability, CurrentUser, Role};
pub use order::{CreateOrderRequest, Direction, Order, OrderFilter, OrderStatus, OrderType, OrderView};
pub use security::Security;
pub use holding::Holding;
pub use actuary::Actuary;
