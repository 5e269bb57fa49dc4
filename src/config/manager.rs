use once_cell::sync::OnceCell;
use config::ConfigError;
use std::path::Path;
use tracing::{debug, warn};
use crate::config::types::ApplicationConfig;
use crate::config::loader::{ConfigLoader, Environment};
use crate::config::validation::Validator;

// 全局配置實例
static CONFIG: OnceCell<ApplicationConfig> = OnceCell::new();

/// 初始化配置（在應用程序啟動時調用）
pub fn init_config(env: Environment, config_dir: &Path) -> Result<&'static ApplicationConfig, ConfigError> {
    let app_config = ApplicationConfig::load(env, config_dir)?;

    if CONFIG.set(app_config).is_err() {
        warn!("Configuration already initialized, keeping the existing one");
    } else {
        debug!("Configuration initialized for {:?}", env);
    }

    CONFIG
        .get()
        .ok_or_else(|| ConfigError::Message("configuration was not initialized".into()))
}

/// ApplicationConfig 加載方法實現
impl ApplicationConfig {
    /// 從指定環境加載並驗證配置
    pub fn load(env: Environment, config_dir: &Path) -> Result<Self, ConfigError> {
        let config_source = ConfigLoader::load(env, config_dir)?;

        let app_config: ApplicationConfig = config_source.try_deserialize()?;

        // 驗證失敗時拒絕啟動
        app_config
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    fn clear_env() {
        for var in [
            "RABBITMQ_CONNECTION_STRING",
            "PORT",
            "ORDER_RELAY__SERVER__PORT",
            "ORDER_RELAY__RELAY__QUEUE_NAME",
            "ORDER_RELAY__RELAY__AUTO_ACK",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_config_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = ApplicationConfig::load(Environment::Development, dir.path()).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rabbitmq.url, "amqp://localhost:5672/%2f");
        assert_eq!(config.relay.queue_name, "order_queue");
    }

    #[test]
    #[serial]
    fn test_file_then_env_precedence() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("production.toml"),
            r#"
[server]
port = 8080

[relay]
queue_name = "orders.prod"
auto_ack = true
"#,
        )
        .unwrap();

        env::set_var("ORDER_RELAY__RELAY__AUTO_ACK", "false");
        let config = ApplicationConfig::load(Environment::Production, dir.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.relay.queue_name, "orders.prod");
        assert!(!config.relay.auto_ack);

        // 舊版變數優先於一切
        env::set_var("PORT", "4100");
        env::set_var("RABBITMQ_CONNECTION_STRING", "amqp://user:pw@broker:5672/%2f");
        let config = ApplicationConfig::load(Environment::Production, dir.path()).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.rabbitmq.url, "amqp://user:pw@broker:5672/%2f");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fail_loading() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        env::set_var("RABBITMQ_CONNECTION_STRING", "localhost");
        assert!(ApplicationConfig::load(Environment::Development, dir.path()).is_err());

        clear_env();
    }
}
