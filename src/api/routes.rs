use axum::Router;

use crate::api::state::AppState;

pub mod orders;
pub mod system;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(orders::routes())
        .merge(system::routes())
}
