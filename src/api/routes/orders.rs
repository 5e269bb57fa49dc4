use axum::{
    routing::get,
    Router,
};
use crate::api::{handlers::orders, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list_orders).post(orders::submit_order))
}
