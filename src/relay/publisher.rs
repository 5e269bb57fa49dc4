use crate::config::types::RelayConfig;
use crate::domain_types::Order;
use crate::messaging::rabbitmq::publisher::MessagePublisher;
use crate::relay::error::{RelayError, RelayResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// 訂單發布端
pub struct RelayPublisher {
    publisher: Arc<dyn MessagePublisher>,
    queue_name: String,
    publish_timeout: Duration,
}

impl RelayPublisher {
    pub fn new(
        publisher: Arc<dyn MessagePublisher>,
        queue_name: impl Into<String>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            publisher,
            queue_name: queue_name.into(),
            publish_timeout,
        }
    }

    pub fn from_config(publisher: Arc<dyn MessagePublisher>, config: &RelayConfig) -> Self {
        Self::new(publisher, config.queue_name.clone(), config.publish_timeout())
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// 驗證並發布一筆訂單
    ///
    /// 驗證失敗時不會觸發任何發布。
    pub async fn submit(&self, candidate: Value) -> RelayResult<Order> {
        let order = Order::from_submission(candidate)?;
        let payload = order.encode().map_err(RelayError::Encode)?;

        debug!("Relaying {} ({} bytes) to {}", order, payload.len(), self.queue_name);

        let publish = self.publisher.publish(&self.queue_name, &payload);

        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(())) => {
                info!("Order sent to {}: {}", self.queue_name, order);
                Ok(order)
            }
            Ok(Err(e)) => {
                error!("Failed to publish {}: {}", order, e);
                Err(RelayError::Unavailable(e.to_string()))
            }
            Err(_) => {
                error!("Publishing {} timed out after {:?}", order, self.publish_timeout);
                Err(RelayError::Unavailable(format!(
                    "publish timed out after {} ms",
                    self.publish_timeout.as_millis()
                )))
            }
        }
    }
}
