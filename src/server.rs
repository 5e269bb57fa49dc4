// server.rs - 伺服器核心組件，宣告子模組
//
// 負責組裝各元件並管理生命週期：
// - broker 連接與消費者啟動（有限次數重試）
// - HTTP 服務與優雅關閉

/// 伺服器構建器實現
pub mod builder;
/// 伺服器級別錯誤處理
pub mod error;

// 重新導出核心組件，簡化外部使用
pub use crate::config::types::ServerConfig;
pub use builder::{Server, ServerBuilder};
pub use error::{ServerError, ServerResult};

/// 伺服器狀態枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// 已構建，尚未連上 broker
    Initializing,
    /// 消費者已訂閱，可以對外服務
    Running,
    /// 伺服器正在關閉
    ShuttingDown,
    /// 伺服器已停止
    Stopped,
}
