use std::sync::Arc;
use tokio::sync::watch;

use crate::messaging::rabbitmq::ConsumerStatus;
use crate::relay::RelayPublisher;
use crate::storage::OrderSnapshot;

/// 所有處理器共用的狀態
#[derive(Clone)]
pub struct AppState {
    /// 只讀取，寫入由消費者負責
    pub snapshot: Arc<dyn OrderSnapshot>,
    pub relay: Arc<RelayPublisher>,
    pub consumer_status: watch::Receiver<ConsumerStatus>,
}

impl AppState {
    pub fn new(
        snapshot: Arc<dyn OrderSnapshot>,
        relay: Arc<RelayPublisher>,
        consumer_status: watch::Receiver<ConsumerStatus>,
    ) -> Self {
        Self {
            snapshot,
            relay,
            consumer_status,
        }
    }
}
