// 儲存模組
// 目前只有進程內的訂單快照，不做任何持久化

pub mod order_snapshot;

pub use order_snapshot::{InMemoryOrderSnapshot, OrderSnapshot};
