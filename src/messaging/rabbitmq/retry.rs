use crate::config::types::RabbitMQConfig;
use crate::messaging::rabbitmq::error::RabbitMQError;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// 指數退避重試策略
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// None 代表無限重試
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_attempts: Some(10),
        }
    }
}

impl RetryPolicy {
    /// 啟動時使用的有限次數策略
    pub fn from_config(config: &RabbitMQConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.retry_initial_ms),
            max_delay: Duration::from_millis(config.retry_max_ms),
            max_attempts: Some(config.max_startup_retries),
        }
    }

    /// 同樣的退避參數但不限次數，供啟動後的重新連接使用
    pub fn unbounded(&self) -> Self {
        Self {
            max_attempts: None,
            ..self.clone()
        }
    }

    /// 第 n 次失敗（從 0 開始）後的等待時間
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// 以退避策略重試非同步操作，直到成功或次數用盡
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut attempt_fn: F,
) -> Result<T, RabbitMQError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RabbitMQError>>,
{
    let mut attempts = 0u32;

    loop {
        match attempt_fn().await {
            Ok(value) => {
                if attempts > 0 {
                    info!(operation, attempts = attempts + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                attempts += 1;

                if policy.exhausted(attempts) {
                    return Err(RabbitMQError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts,
                        last_error: err.to_string(),
                    });
                }

                let delay = policy.delay_for(attempts - 1);
                warn!(
                    operation,
                    attempt = attempts,
                    max_attempts = ?policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
