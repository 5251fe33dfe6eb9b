pub mod db_init;
pub mod store;
pub mod mongo_store;
pub mod memory_store;
pub mod banking;
pub mod matching;

pub mod order_classifier;
pub mod inventory_service;
pub mod margin_service;
pub mod order_service;
