use crate::config::types::{RabbitMQConfig, RelayConfig};
use crate::domain_types::Order;
use crate::messaging::rabbitmq::{
    ConsumerConfig, DeliveryHandler, QueueOptions, RabbitMQConnectionManager, RabbitMQConsumer,
    RabbitMQError, RetryPolicy,
};
use crate::relay::error::RelayError;
use crate::storage::OrderSnapshot;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// 將 broker 投遞的訂單寫入快照
pub struct OrderDeliveryHandler {
    snapshot: Arc<dyn OrderSnapshot>,
}

impl OrderDeliveryHandler {
    pub fn new(snapshot: Arc<dyn OrderSnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl DeliveryHandler for OrderDeliveryHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), RabbitMQError> {
        let order = match Order::decode(payload) {
            Ok(order) => order,
            Err(e) => {
                let err = RelayError::Decode(e);
                warn!(
                    payload = %String::from_utf8_lossy(payload),
                    "Dropping undecodable order: {}",
                    err
                );
                return Err(RabbitMQError::InvalidMessage(err.to_string()));
            }
        };

        info!("Received order: {}", order);
        self.snapshot.append(order);

        Ok(())
    }
}

/// 組裝訂單佇列的消費者
pub fn build_order_consumer(
    connection_manager: RabbitMQConnectionManager,
    rabbitmq: &RabbitMQConfig,
    relay: &RelayConfig,
    snapshot: Arc<dyn OrderSnapshot>,
) -> RabbitMQConsumer {
    let config = ConsumerConfig {
        queue_name: relay.queue_name.clone(),
        queue_options: QueueOptions {
            durable: relay.queue_durable,
            ..QueueOptions::default()
        },
        consumer_tag: Some(format!(
            "{}-{}",
            rabbitmq.consumer_tag_prefix,
            uuid::Uuid::new_v4()
        )),
        prefetch_count: rabbitmq.prefetch_count,
        auto_ack: relay.auto_ack,
    };

    RabbitMQConsumer::new(
        connection_manager,
        config,
        Arc::new(OrderDeliveryHandler::new(snapshot)),
        RetryPolicy::from_config(rabbitmq),
    )
}
