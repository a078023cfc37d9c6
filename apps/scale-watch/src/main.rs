//! 命令行秤监控
//!
//! 秤来源：`--scale ID=HOST:PORT`（可重复），未指定时读取配置文件中的全部秤。
//! 每条读数打印一段文本；Ctrl+C 停止监控并退出。

use async_trait::async_trait;
use clap::Parser;
use domain::{ScaleConfig, WeightReading, to_iso_millis};
use scale_config::AppConfig;
use scale_monitor::{MonitorRegistry, WeightEventSink};
use scale_protocol::{MonitorSettings, ProtocolError};
use scale_store::{JsonFileScaleStore, ScaleStore};
use scale_telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "scale-watch", about = "Continuously monitor weighing terminals")]
struct Args {
    /// 监控的秤，格式 `ID=HOST:PORT`，可重复
    #[arg(long = "scale", value_parser = parse_scale_arg)]
    scales: Vec<ScaleConfig>,

    /// 未指定 --scale 时读取的配置文件（缺省取 SCALE_CONFIG_FILE）
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// 断线重连延迟（毫秒，缺省取 SCALE_RECONNECT_DELAY_MS）
    #[arg(long)]
    reconnect_delay_ms: Option<u64>,
}

fn parse_scale_arg(value: &str) -> Result<ScaleConfig, String> {
    let (id, addr) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=HOST:PORT, got `{value}`"))?;
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| format!("expected HOST:PORT in `{value}`"))?;
    let (id, host) = (id.trim(), host.trim());
    if id.is_empty() || host.is_empty() {
        return Err(format!("missing scale id or host in `{value}`"));
    }
    let port: u16 = port
        .trim()
        .parse()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| format!("invalid port in `{value}`"))?;
    Ok(ScaleConfig::new(id, host, port))
}

/// 把读数打印到标准输出
struct ConsoleSink;

#[async_trait]
impl WeightEventSink for ConsoleSink {
    async fn weight_received(&self, reading: &WeightReading) {
        println!(
            "Received weight data:\n    Scale ID: {}\n    Weight: {} kg\n    Time: {}\n------------------------",
            reading.scale_id,
            reading.weight_kg,
            to_iso_millis(&reading.timestamp)
        );
    }

    async fn error(&self, scale_id: &str, error: &ProtocolError) {
        warn!(scale_id = %scale_id, error = %error, "scale error");
    }
}

async fn load_scales(path: PathBuf) -> Result<Vec<ScaleConfig>, Box<dyn std::error::Error>> {
    let store = JsonFileScaleStore::open(path).await?;
    Ok(store
        .list()
        .await?
        .iter()
        .map(|(name, record)| record.to_scale_config(name))
        .collect())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();
    let args = Args::parse();

    let scales = if args.scales.is_empty() {
        load_scales(args.config_file.unwrap_or(config.config_file.clone())).await?
    } else {
        args.scales
    };
    if scales.is_empty() {
        warn!("no scales configured, nothing to monitor");
        return Ok(());
    }

    let reconnect_delay = args
        .reconnect_delay_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.reconnect_delay());
    let registry = MonitorRegistry::with_settings(MonitorSettings::with_reconnect_delay(
        reconnect_delay,
    ));
    for scale in scales {
        registry.add_scale(scale);
    }
    registry.subscribe(Arc::new(ConsoleSink));
    registry.start_monitoring();
    info!(scales = ?registry.scale_ids(), "scale monitoring started, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    registry.stop_monitoring();
    Ok(())
}
