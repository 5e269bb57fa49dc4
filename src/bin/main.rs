use anyhow::{anyhow, Result};
use clap::Parser;
use order_relay::config::{self, ConfigLoader, Environment, LogConfig};
use order_relay::server::ServerBuilder;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 訂單轉送服務
#[derive(Debug, Parser)]
#[command(name = "order_relay", version, about)]
struct Cli {
    /// 配置環境（預設讀取 ORDER_RELAY_ENV）
    #[arg(long, value_enum)]
    env: Option<Environment>,

    /// 配置目錄（預設讀取 CONFIG_DIR，否則為 ./config）
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化配置
    let env = cli.env.unwrap_or_else(Environment::from_env);
    let config_dir = cli.config_dir.unwrap_or_else(ConfigLoader::default_dir);
    let app_config = config::init_config(env, &config_dir)?;

    // 初始化日誌系統
    init_logging(&app_config.log)?;
    info!("Loaded {:?} configuration from {}", env, config_dir.display());

    let mut server = ServerBuilder::new()
        .with_config(app_config.clone())
        .build()
        .await?;

    // broker 無法使用時不對外提供服務
    if let Err(e) = server.start().await {
        error!("Order relay failed to start: {}", e);
        return Err(e.into());
    }

    let served = server.serve(shutdown_signal()).await;

    server.shutdown().await?;

    served.map_err(|e| anyhow!("REST API failed: {}", e))
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, exiting..."),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

// 初始化日誌系統，RUST_LOG 優先於配置中的級別
fn init_logging(log_config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_config.level.to_lowercase()))
        .map_err(|e| anyhow!("Invalid log level: {}", e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if log_config.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging initialized");
    Ok(())
}
