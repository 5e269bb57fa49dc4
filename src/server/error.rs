use thiserror::Error;
use crate::messaging::rabbitmq::RabbitMQError;

/// 伺服器錯誤類型
#[derive(Error, Debug)]
pub enum ServerError {
    /// 配置錯誤
    #[error("Configuration error: {0}")]
    Config(String),

    /// RabbitMQ 連接或訂閱失敗
    #[error("Broker error: {0}")]
    Broker(#[from] RabbitMQError),

    /// IO 錯誤
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 狀態不允許此操作
    #[error("Invalid server state: {0}")]
    State(String),
}

/// 伺服器結果類型別名
pub type ServerResult<T> = Result<T, ServerError>;
