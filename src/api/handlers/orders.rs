use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::api::{error::ApiError, state::AppState};

/// 提交成功時的回應內容
pub const ORDER_ACCEPTED: &str = "Order received and sent to the queue.";

/// GET /orders：依到達順序列出所有已收到的訂單
pub async fn list_orders(State(state): State<AppState>) -> impl IntoResponse {
    let orders = state.snapshot.list_all();
    debug!("Listing {} orders", orders.len());

    Json(orders)
}

/// POST /orders：驗證後轉送至 broker，不直接寫入快照
pub async fn submit_order(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(candidate) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    state.relay.submit(candidate).await?;

    Ok((StatusCode::OK, ORDER_ACCEPTED))
}
