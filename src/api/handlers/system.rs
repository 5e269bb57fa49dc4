use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::api::state::AppState;
use crate::messaging::rabbitmq::ConsumerStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    consumer: ConsumerStatus,
    orders: usize,
}

/// 消費者正常運作時回傳 200，重新連線中或已停止時回傳 503
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let consumer = *state.consumer_status.borrow();

    let (code, status) = match consumer {
        ConsumerStatus::Consuming => (StatusCode::OK, "ok"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    let health_response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        consumer,
        orders: state.snapshot.len(),
    };

    (code, Json(health_response))
}
