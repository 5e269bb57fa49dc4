use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::domain_types::DomainError;
use crate::relay::RelayError;

/// 缺少欄位時回傳給呼叫端的訊息
pub const MISSING_ORDER_INFO: &str = "Missing order information (id, item, quantity are required).";

/// API 錯誤
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 請求本身不合法（例如 body 不是 JSON）
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Relay(RelayError::Validation(DomainError::MissingOrderFields { .. }))
            | ApiError::Relay(RelayError::Validation(DomainError::NotAnObject(_))) => {
                (StatusCode::BAD_REQUEST, MISSING_ORDER_INFO.to_string())
            }
            ApiError::Relay(err @ RelayError::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            ApiError::Relay(err @ (RelayError::Encode(_) | RelayError::Decode(_))) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        warn!(status = status.as_u16(), "Request failed: {}", self);

        (status, Json(json!({ "error": message }))).into_response()
    }
}
