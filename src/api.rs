// api.rs - API服務模組，宣告子模組
//
// 對外提供 REST 接口：
// - 訂單查詢與提交
// - 系統健康檢查

/// API 錯誤與回應映射
pub mod error;
/// 處理器共用狀態
pub mod state;
/// REST API實現
pub mod rest;
/// API路由定義
pub mod routes;
/// API處理器模組
pub mod handlers;

pub use error::ApiError;
pub use rest::RestApi;
pub use routes::api_routes;
pub use state::AppState;
