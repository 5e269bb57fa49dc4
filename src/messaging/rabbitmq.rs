// RabbitMQ 模組
// 提供與 RabbitMQ 通訊的基礎設施

// 導出子模組
pub mod connection;
pub mod consumer;
pub mod error;
pub mod publisher;
pub mod retry;

// 重新導出常用結構
pub use connection::{QueueOptions, RabbitMQConnectionConfig, RabbitMQConnectionManager};
pub use consumer::{
    ConsumerConfig, ConsumerStatus, DeliveryHandler, DeliverySource, DeliveryStream, InboundMessage,
    QueueSubscription, RabbitMQConsumer,
};
pub use error::RabbitMQError;
pub use publisher::{MessagePublisher, PublisherConfig, RabbitMQPublisher};
pub use retry::{retry_with_backoff, RetryPolicy};
