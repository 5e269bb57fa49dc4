/// 配置管理模組
///
/// 本模組負責加載、驗證和管理系統配置。
/// 支持開發與生產兩種環境，並可由環境變數覆寫。
// 宣告子模組
pub mod loader;
pub mod manager;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigLoader, Environment};
pub use manager::init_config;
pub use types::*;
pub use validation::{ValidationError, ValidationUtils, Validator};
