use crate::config::types::RabbitMQConfig;
use crate::messaging::rabbitmq::error::RabbitMQError;
use deadpool_lapin::{Manager, Object, Pool};
use lapin::{options::QueueDeclareOptions, types::FieldTable, Channel, ConnectionProperties};
use std::time::Duration;
use tracing::{debug, info};

pub type RabbitMQPool = Pool;

/// 連接池設定
#[derive(Clone, Debug)]
pub struct RabbitMQConnectionConfig {
    pub url: String,
    pub pool_size: usize,
    pub connection_timeout: Duration,
}

impl From<&RabbitMQConfig> for RabbitMQConnectionConfig {
    fn from(config: &RabbitMQConfig) -> Self {
        Self {
            url: config.url.clone(),
            pool_size: config.pool_size as usize,
            connection_timeout: Duration::from_secs(config.connection_timeout_secs),
        }
    }
}

/// 佇列宣告選項
///
/// 預設為非持久化佇列：broker 重啟後訊息會遺失。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueOptions {
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
}

impl From<&QueueOptions> for QueueDeclareOptions {
    fn from(options: &QueueOptions) -> Self {
        QueueDeclareOptions {
            durable: options.durable,
            exclusive: options.exclusive,
            auto_delete: options.auto_delete,
            ..QueueDeclareOptions::default()
        }
    }
}

/// RabbitMQ 連接管理器
///
/// 連接由 deadpool 管理，已斷線的連接在回收時會被丟棄，
/// 下一次 `get_connection` 便會重新建立。
#[derive(Clone)]
pub struct RabbitMQConnectionManager {
    pool: RabbitMQPool,
    config: RabbitMQConnectionConfig,
}

impl RabbitMQConnectionManager {
    /// 建立連接池（不會立即連線）
    pub fn new(config: RabbitMQConnectionConfig) -> Result<Self, RabbitMQError> {
        debug!("Creating RabbitMQ connection pool for {}", redact_url(&config.url));

        let properties = ConnectionProperties::default()
            .with_executor(tokio_executor_trait::Tokio::current());
        let manager = Manager::new(config.url.clone(), properties);
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .build()
            .map_err(|e| RabbitMQError::Connection(format!("Failed to build pool: {}", e)))?;

        Ok(Self { pool, config })
    }

    pub fn from_config(config: &RabbitMQConfig) -> Result<Self, RabbitMQError> {
        Self::new(RabbitMQConnectionConfig::from(config))
    }

    /// 建立並驗證一條連接，失敗時由呼叫端決定是否重試
    pub async fn connect(&self) -> Result<(), RabbitMQError> {
        let conn = self.get_connection().await?;
        info!(
            "Connected to RabbitMQ at {} (status: {:?})",
            redact_url(&self.config.url),
            conn.status().state()
        );
        Ok(())
    }

    /// 從連接池取得連接
    pub async fn get_connection(&self) -> Result<Object, RabbitMQError> {
        match tokio::time::timeout(self.config.connection_timeout, self.pool.get()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RabbitMQError::Timeout(format!(
                "connecting to {}",
                redact_url(&self.config.url)
            ))),
        }
    }

    /// 開啟新通道
    pub async fn open_channel(&self) -> Result<Channel, RabbitMQError> {
        let conn = self.get_connection().await?;
        let channel = conn.create_channel().await?;
        debug!("Opened channel {}", channel.id());
        Ok(channel)
    }

    /// 宣告佇列，使用相同選項重複宣告是安全的
    pub async fn declare_queue(
        channel: &Channel,
        queue_name: &str,
        options: &QueueOptions,
    ) -> Result<(), RabbitMQError> {
        debug!("Declaring queue: {} ({:?})", queue_name, options);

        channel
            .queue_declare(queue_name, options.into(), FieldTable::default())
            .await?;

        Ok(())
    }

    /// 檢查連接狀態
    pub async fn check_health(&self) -> Result<(), RabbitMQError> {
        let conn = self.get_connection().await?;
        if conn.status().connected() {
            Ok(())
        } else {
            Err(RabbitMQError::Connection("Connection is not open".into()))
        }
    }

    /// 關閉連接池，之後的 `get_connection` 都會失敗
    pub fn close(&self) {
        info!("Closing RabbitMQ connection pool");
        self.pool.close();
    }
}

/// 日誌中隱藏 URL 內的密碼
pub(crate) fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
