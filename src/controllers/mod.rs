pub mod home_controller;
pub mod order_controller;
