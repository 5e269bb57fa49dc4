use crate::domain_types::Order;
use parking_lot::RwLock;
use tracing::debug;

/// 訂單快照介面
///
/// 只能追加、不能修改或刪除。寫入端只有消費者，讀取端是 API。
pub trait OrderSnapshot: Send + Sync {
    /// 追加到序列尾端
    fn append(&self, order: Order);

    /// 依到達順序回傳所有訂單的副本
    fn list_all(&self) -> Vec<Order>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 記憶體內的訂單快照
#[derive(Debug, Default)]
pub struct InMemoryOrderSnapshot {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderSnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderSnapshot for InMemoryOrderSnapshot {
    fn append(&self, order: Order) {
        let mut orders = self.orders.write();
        orders.push(order);
        debug!("Snapshot now holds {} orders", orders.len());
    }

    fn list_all(&self) -> Vec<Order> {
        // 在讀鎖內複製，呼叫端看不到追加到一半的狀態
        self.orders.read().clone()
    }

    fn len(&self) -> usize {
        self.orders.read().len()
    }
}
