use crate::messaging::rabbitmq::connection::{QueueOptions, RabbitMQConnectionManager};
use crate::messaging::rabbitmq::error::RabbitMQError;
use crate::messaging::rabbitmq::retry::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use lapin::{
    acker::Acker,
    message::Delivery,
    options::{BasicAckOptions, BasicConsumeOptions, BasicQosOptions, BasicRejectOptions},
    types::FieldTable,
    Consumer,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 消息處理器特徵
///
/// 處理器在投遞迴圈內同步等待，只應做解碼與寫入這類短工作。
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<(), RabbitMQError>;
}

/// 單則投遞：負載與 broker 端的確認句柄
pub struct InboundMessage {
    pub delivery_tag: u64,
    pub data: Vec<u8>,
    acker: Option<Acker>,
}

impl InboundMessage {
    /// 不需要回覆確認的訊息
    pub fn without_ack(delivery_tag: u64, data: Vec<u8>) -> Self {
        Self {
            delivery_tag,
            data,
            acker: None,
        }
    }
}

impl From<Delivery> for InboundMessage {
    fn from(delivery: Delivery) -> Self {
        Self {
            delivery_tag: delivery.delivery_tag,
            data: delivery.data,
            acker: Some(delivery.acker),
        }
    }
}

/// 投遞串流，結束即代表訂閱已中斷
pub type DeliveryStream = BoxStream<'static, Result<InboundMessage, RabbitMQError>>;

/// 投遞來源：每次呼叫 `subscribe` 都建立一個新的訂閱
#[async_trait]
pub trait DeliverySource: Send + Sync {
    async fn subscribe(&self) -> Result<DeliveryStream, RabbitMQError>;
}

/// 以 RabbitMQ 佇列作為投遞來源
pub struct QueueSubscription {
    connection_manager: RabbitMQConnectionManager,
    config: ConsumerConfig,
}

impl QueueSubscription {
    pub fn new(connection_manager: RabbitMQConnectionManager, config: ConsumerConfig) -> Self {
        Self {
            connection_manager,
            config,
        }
    }
}

#[async_trait]
impl DeliverySource for QueueSubscription {
    async fn subscribe(&self) -> Result<DeliveryStream, RabbitMQError> {
        let consumer = subscribe(&self.connection_manager, &self.config).await?;

        Ok(consumer
            .map(|delivery| delivery.map(InboundMessage::from).map_err(RabbitMQError::from))
            .boxed())
    }
}

/// 消息消費者配置
#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    pub queue_name: String,
    pub queue_options: QueueOptions,
    pub consumer_tag: Option<String>,
    pub prefetch_count: u16,
    /// true：收到即視為完成（處理失敗時訊息遺失）
    /// false：處理成功後才 ack，無法解碼的訊息 reject 且不重新排隊
    pub auto_ack: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            queue_name: String::new(),
            queue_options: QueueOptions::default(),
            consumer_tag: None,
            prefetch_count: 10,
            auto_ack: true,
        }
    }
}

/// 消費者狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerStatus {
    Starting,
    Consuming,
    Reconnecting,
    Stopped,
}

/// 投遞迴圈結束的原因
#[derive(Debug, PartialEq, Eq)]
enum ConsumeExit {
    Shutdown,
    StreamClosed,
}

/// 消息消費者
///
/// `start` 在有限次數內完成訂閱，之後由背景任務監督：
/// 投遞串流中斷時以指數退避重新訂閱，直到收到關閉訊號。
pub struct RabbitMQConsumer {
    source: Arc<dyn DeliverySource>,
    config: ConsumerConfig,
    handler: Arc<dyn DeliveryHandler>,
    retry_policy: RetryPolicy,
    status_tx: Arc<watch::Sender<ConsumerStatus>>,
    running_task: Option<JoinHandle<()>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl RabbitMQConsumer {
    /// 創建訂閱 RabbitMQ 佇列的消費者
    pub fn new(
        connection_manager: RabbitMQConnectionManager,
        config: ConsumerConfig,
        handler: Arc<dyn DeliveryHandler>,
        retry_policy: RetryPolicy,
    ) -> Self {
        let source = Arc::new(QueueSubscription::new(connection_manager, config.clone()));
        Self::with_source(source, config, handler, retry_policy)
    }

    /// 從任意投遞來源消費
    pub fn with_source(
        source: Arc<dyn DeliverySource>,
        config: ConsumerConfig,
        handler: Arc<dyn DeliveryHandler>,
        retry_policy: RetryPolicy,
    ) -> Self {
        let (status_tx, _) = watch::channel(ConsumerStatus::Starting);

        Self {
            source,
            config,
            handler,
            retry_policy,
            status_tx: Arc::new(status_tx),
            running_task: None,
            shutdown_tx: None,
        }
    }

    /// 訂閱狀態變化
    pub fn status(&self) -> watch::Receiver<ConsumerStatus> {
        self.status_tx.subscribe()
    }

    /// 開始消費消息
    pub async fn start(&mut self) -> Result<(), RabbitMQError> {
        if self.running_task.is_some() {
            warn!("Consumer is already running");
            return Ok(());
        }

        let source = &self.source;
        let stream = retry_with_backoff(&self.retry_policy, "subscribe", || source.subscribe()).await?;

        self.status_tx.send_replace(ConsumerStatus::Consuming);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let supervisor = Supervisor {
            source: self.source.clone(),
            config: self.config.clone(),
            handler: self.handler.clone(),
            retry_policy: self.retry_policy.unbounded(),
            status_tx: self.status_tx.clone(),
        };

        let queue_name = self.config.queue_name.clone();
        let task = tokio::spawn(async move {
            info!("Consumer started for queue: {}", queue_name);
            supervisor.run(stream, shutdown_rx).await;
            info!("Consumer stopped for queue: {}", queue_name);
        });

        self.running_task = Some(task);

        Ok(())
    }

    /// 停止消費者
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            debug!("Sending shutdown signal to consumer");

            let _ = shutdown_tx.send(()).await;

            if let Some(task) = self.running_task.take() {
                if let Err(e) = task.await {
                    error!("Error waiting for consumer task: {}", e);
                }
            }
        }

        self.status_tx.send_replace(ConsumerStatus::Stopped);
    }

    /// 檢查消費者健康狀態
    pub fn check_health(&self) -> Result<(), RabbitMQError> {
        match &self.running_task {
            Some(task) if task.is_finished() => Err(RabbitMQError::Other(
                "Consumer task has finished unexpectedly".into(),
            )),
            Some(_) => match *self.status_tx.borrow() {
                ConsumerStatus::Consuming => Ok(()),
                status => Err(RabbitMQError::Other(format!("Consumer is {:?}", status))),
            },
            None => Err(RabbitMQError::Other("Consumer is not running".into())),
        }
    }
}

/// 宣告佇列並註冊消費者
async fn subscribe(
    connection_manager: &RabbitMQConnectionManager,
    config: &ConsumerConfig,
) -> Result<Consumer, RabbitMQError> {
    let channel = connection_manager.open_channel().await?;

    channel
        .basic_qos(config.prefetch_count, BasicQosOptions::default())
        .await?;

    RabbitMQConnectionManager::declare_queue(&channel, &config.queue_name, &config.queue_options)
        .await?;

    let consumer_tag = config
        .consumer_tag
        .clone()
        .unwrap_or_else(|| format!("consumer-{}", uuid::Uuid::new_v4()));

    let consumer = channel
        .basic_consume(
            &config.queue_name,
            &consumer_tag,
            BasicConsumeOptions {
                no_ack: config.auto_ack,
                ..BasicConsumeOptions::default()
            },
            FieldTable::default(),
        )
        .await?;

    info!(
        "Waiting for messages in {} (tag: {}, auto_ack: {})",
        config.queue_name, consumer_tag, config.auto_ack
    );

    Ok(consumer)
}

struct Supervisor {
    source: Arc<dyn DeliverySource>,
    config: ConsumerConfig,
    handler: Arc<dyn DeliveryHandler>,
    retry_policy: RetryPolicy,
    status_tx: Arc<watch::Sender<ConsumerStatus>>,
}

impl Supervisor {
    async fn run(self, mut stream: DeliveryStream, mut shutdown_rx: mpsc::Receiver<()>) {
        loop {
            let exit = consume_messages(
                &mut stream,
                self.handler.as_ref(),
                self.config.auto_ack,
                &mut shutdown_rx,
            )
            .await;

            if exit == ConsumeExit::Shutdown {
                break;
            }

            warn!(
                "Delivery stream for {} ended, reconnecting",
                self.config.queue_name
            );
            self.status_tx.send_replace(ConsumerStatus::Reconnecting);

            let source = &self.source;
            let resubscribe =
                retry_with_backoff(&self.retry_policy, "resubscribe", || source.subscribe());

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Received shutdown signal while reconnecting");
                    break;
                }
                result = resubscribe => match result {
                    Ok(next) => {
                        stream = next;
                        self.status_tx.send_replace(ConsumerStatus::Consuming);
                        info!("Consumer re-subscribed to {}", self.config.queue_name);
                    }
                    Err(e) => {
                        error!("Giving up on consumer for {}: {}", self.config.queue_name, e);
                        break;
                    }
                }
            }
        }

        self.status_tx.send_replace(ConsumerStatus::Stopped);
    }
}

/// 處理消息消費邏輯
async fn consume_messages(
    stream: &mut DeliveryStream,
    handler: &dyn DeliveryHandler,
    auto_ack: bool,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> ConsumeExit {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Received shutdown signal");
                return ConsumeExit::Shutdown;
            }

            delivery_result = stream.next() => {
                match delivery_result {
                    Some(Ok(message)) => dispatch(message, handler, auto_ack).await,
                    Some(Err(e)) => {
                        error!("Error receiving message: {}", e);
                        return ConsumeExit::StreamClosed;
                    }
                    None => {
                        debug!("Consumer channel closed");
                        return ConsumeExit::StreamClosed;
                    }
                }
            }
        }
    }
}

async fn dispatch(message: InboundMessage, handler: &dyn DeliveryHandler, auto_ack: bool) {
    let delivery_tag = message.delivery_tag;
    debug!("Received message with delivery_tag: {}", delivery_tag);

    let result = handler.handle(&message.data).await;

    if let Err(e) = &result {
        warn!("Dropping message {}: {}", delivery_tag, e);
    }

    if auto_ack {
        return;
    }

    let Some(acker) = message.acker else {
        return;
    };

    let ack_result = match result {
        Ok(()) => acker.ack(BasicAckOptions::default()).await,
        // 重新排隊只會讓同一則壞訊息無限循環
        Err(_) => acker.reject(BasicRejectOptions { requeue: false }).await,
    };

    if let Err(e) = ack_result {
        error!("Failed to acknowledge message {}: {}", delivery_tag, e);
    }
}
