use lapin::Error as LapinError;
use thiserror::Error;

/// RabbitMQ 系統通用錯誤類型
#[derive(Error, Debug)]
pub enum RabbitMQError {
    /// 無法建立或取得連接
    #[error("Connection error: {0}")]
    Connection(String),

    /// 通道或協定層錯誤
    #[error("Channel error: {0}")]
    Channel(#[from] LapinError),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Timed out while {0}")]
    Timeout(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Retries exhausted for {operation} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Other error: {0}")]
    Other(String),
}

impl RabbitMQError {
    /// 是否為連接層級的錯誤（重新取得連接可能恢復）
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            RabbitMQError::Connection(_) | RabbitMQError::Channel(_) | RabbitMQError::Timeout(_)
        )
    }
}

impl From<deadpool_lapin::PoolError> for RabbitMQError {
    fn from(error: deadpool_lapin::PoolError) -> Self {
        RabbitMQError::Connection(error.to_string())
    }
}
