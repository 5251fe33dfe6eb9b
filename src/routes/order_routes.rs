use axum::{Router, middleware::from_fn, routing::{get, post}};

use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let supervised = Router::<AppState>::new()
        .route("/orders/:id/approve", post(order_controller::approve_order))
        .route("/orders/:id/decline", post(order_controller::decline_order))
        .route_layer(from_fn(crate::auth::require_supervisor));

    router
        .route("/orders", get(order_controller::list_orders).post(order_controller::create_order))
        .route("/orders/:id", get(order_controller::get_order))
        .merge(supervised)
}
