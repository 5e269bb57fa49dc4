// 模組定義
pub mod api;
pub mod config;
pub mod domain_types;
pub mod messaging;
pub mod relay;
pub mod server;
pub mod storage;
