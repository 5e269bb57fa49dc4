use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use std::env;
use std::path::{Path, PathBuf};

/// 環境變數前綴，例如 ORDER_RELAY__SERVER__PORT
pub const ENV_PREFIX: &str = "ORDER_RELAY";

/// 舊版部署使用的環境變數
pub const LEGACY_BROKER_URL_VAR: &str = "RABBITMQ_CONNECTION_STRING";
pub const LEGACY_PORT_VAR: &str = "PORT";

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從環境變數取得當前環境設定
    pub fn from_env() -> Self {
        match env::var("ORDER_RELAY_ENV")
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 配置加載器，負責根據環境加載適當的配置
pub struct ConfigLoader;

impl ConfigLoader {
    /// 預設配置目錄，可由 CONFIG_DIR 覆寫
    pub fn default_dir() -> PathBuf {
        PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into()))
    }

    /// 載入指定環境的配置
    ///
    /// 優先順序（低到高）：內建預設值、環境配置檔（可不存在）、
    /// ORDER_RELAY__* 環境變數、RABBITMQ_CONNECTION_STRING 與 PORT。
    pub fn load(env: Environment, config_dir: &Path) -> Result<Config, ConfigError> {
        let config_path = config_dir.join(env.as_filename());

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                ConfigEnvironment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("rabbitmq.url", non_empty_var(LEGACY_BROKER_URL_VAR))?
            .set_override_option("server.port", non_empty_var(LEGACY_PORT_VAR))?
            .build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
