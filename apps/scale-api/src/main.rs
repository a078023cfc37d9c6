//! 秤 HTTP API 入口

use scale_api::{AppState, app};
use scale_config::AppConfig;
use scale_monitor::RequestSettings;
use scale_protocol::MonitorSettings;
use scale_store::JsonFileScaleStore;
use scale_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let store = Arc::new(JsonFileScaleStore::open(&config.config_file).await?);
    let request = RequestSettings {
        timeout: config.request_timeout(),
        monitor: MonitorSettings::with_reconnect_delay(config.reconnect_delay()),
    };
    let app = app(AppState::new(store, request));

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(addr = %config.http_addr, "scale api server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("scale api server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
