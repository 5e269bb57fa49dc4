use crate::messaging::rabbitmq::connection::{QueueOptions, RabbitMQConnectionManager};
use crate::messaging::rabbitmq::error::RabbitMQError;
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions},
    publisher_confirm::Confirmation,
    BasicProperties, Channel,
};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 將原始位元組發布到指定佇列
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, queue_name: &str, payload: &[u8]) -> Result<(), RabbitMQError>;
}

/// 發布者配置
#[derive(Clone, Debug, Default)]
pub struct PublisherConfig {
    /// 發布前宣告佇列時使用的選項，需與消費端一致
    pub queue_options: QueueOptions,
    /// delivery_mode = 2
    pub persistent: bool,
    /// 是否等待 broker 的 publisher confirm
    pub publish_confirm: bool,
}

struct PublishChannel {
    channel: Channel,
    declared_queues: HashSet<String>,
}

/// 消息發布者
///
/// 透過預設交換機（routing key 即佇列名稱）發布。通道會被重用，
/// 通道或連接失效時丟棄並在下一次發布時重新建立。
pub struct RabbitMQPublisher {
    connection_manager: RabbitMQConnectionManager,
    config: PublisherConfig,
    channel: Mutex<Option<PublishChannel>>,
}

impl RabbitMQPublisher {
    /// 創建新的消息發布者
    pub fn new(connection_manager: RabbitMQConnectionManager, config: PublisherConfig) -> Self {
        Self {
            connection_manager,
            config,
            channel: Mutex::new(None),
        }
    }

    /// 取得可用通道，並確保目標佇列已宣告
    async fn ensure_channel(&self, queue_name: &str) -> Result<Channel, RabbitMQError> {
        let mut guard = self.channel.lock().await;

        if guard
            .as_ref()
            .is_some_and(|current| !current.channel.status().connected())
        {
            warn!("Publisher channel is closed, reopening");
            *guard = None;
        }

        if guard.is_none() {
            let channel = self.connection_manager.open_channel().await?;

            if self.config.publish_confirm {
                channel
                    .confirm_select(ConfirmSelectOptions::default())
                    .await?;
            }

            info!("Publisher channel {} opened", channel.id());
            *guard = Some(PublishChannel {
                channel,
                declared_queues: HashSet::new(),
            });
        }

        let current = guard
            .as_mut()
            .ok_or_else(|| RabbitMQError::Other("Publisher channel unavailable".into()))?;

        if !current.declared_queues.contains(queue_name) {
            RabbitMQConnectionManager::declare_queue(
                &current.channel,
                queue_name,
                &self.config.queue_options,
            )
            .await?;
            current.declared_queues.insert(queue_name.to_string());
        }

        Ok(current.channel.clone())
    }

    async fn invalidate_channel(&self) {
        let mut guard = self.channel.lock().await;
        *guard = None;
    }

    async fn publish_on(
        &self,
        channel: &Channel,
        queue_name: &str,
        payload: &[u8],
    ) -> Result<(), RabbitMQError> {
        let mut properties =
            BasicProperties::default().with_content_type("application/json".into());

        if self.config.persistent {
            properties = properties.with_delivery_mode(2);
        }

        let confirm = channel
            .basic_publish(
                "",
                queue_name,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await?;

        if self.config.publish_confirm {
            match confirm.await? {
                Confirmation::Ack(_) => {}
                Confirmation::Nack(_) => {
                    return Err(RabbitMQError::Publish(format!(
                        "Broker rejected message for queue {}",
                        queue_name
                    )))
                }
                Confirmation::NotRequested => {}
            }
        }

        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for RabbitMQPublisher {
    async fn publish(&self, queue_name: &str, payload: &[u8]) -> Result<(), RabbitMQError> {
        let channel = self.ensure_channel(queue_name).await?;

        debug!(
            "Publishing {} bytes to queue: {}",
            payload.len(),
            queue_name
        );

        if let Err(err) = self.publish_on(&channel, queue_name, payload).await {
            if err.is_connection_error() {
                self.invalidate_channel().await;
            }
            return Err(err);
        }

        debug!("Message published to queue: {}", queue_name);

        Ok(())
    }
}
