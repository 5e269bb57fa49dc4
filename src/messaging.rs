// 消息系統模組
// 提供基於 RabbitMQ 的消息中間件機制，負責訂單在 HTTP 與 broker 之間的傳遞

// 導出子模組
pub mod rabbitmq;

// 重新導出常用類型
pub use rabbitmq::connection::RabbitMQConnectionManager;
pub use rabbitmq::consumer::RabbitMQConsumer;
pub use rabbitmq::error::RabbitMQError;
pub use rabbitmq::publisher::{MessagePublisher, RabbitMQPublisher};
