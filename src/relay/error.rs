use crate::domain_types::DomainError;
use thiserror::Error;

/// 訂單轉送錯誤
#[derive(Error, Debug)]
pub enum RelayError {
    /// 呼叫端輸入缺陷，對應 4xx
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// broker 不可用（發布失敗或逾時），對應 5xx
    #[error("Order relay unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode order: {0}")]
    Encode(#[source] serde_json::Error),

    /// 收到無法解碼的消息，只在消費端出現
    #[error("Failed to decode delivered order: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type RelayResult<T> = Result<T, RelayError>;
