// 訂單轉送模組
//
// 寫入路徑：API -> RelayPublisher -> broker
// 讀取路徑：broker -> OrderDeliveryHandler -> 訂單快照 -> API
// 發布端不直接寫入快照，訂單必須繞 broker 一圈才會出現在查詢結果中。

pub mod consumer;
pub mod error;
pub mod publisher;

pub use consumer::{build_order_consumer, OrderDeliveryHandler};
pub use error::{RelayError, RelayResult};
pub use publisher::RelayPublisher;
