//! 秤终端模拟器入口：为每台模拟秤监听一个端口，Ctrl+C 退出。

use clap::Parser;
use scale_simulator::{ScaleSimulator, SimulatorConfig};
use scale_telemetry::init_tracing;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "scale-simulator", about = "Simulated weighing terminals")]
struct Args {
    /// 模拟秤，格式 `ID=PORT`，可重复；缺省为 SCALE_01..03 → 3002..3004
    #[arg(long = "scale", value_parser = parse_scale_arg)]
    scales: Vec<(String, u16)>,

    /// 监听地址
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// 回复前的模拟处理耗时（毫秒）
    #[arg(long, default_value_t = 100)]
    reply_delay_ms: u64,

    #[arg(long, default_value_t = 1000)]
    min_weight: u32,

    #[arg(long, default_value_t = 9999)]
    max_weight: u32,
}

fn parse_scale_arg(value: &str) -> Result<(String, u16), String> {
    let (id, port) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PORT, got `{value}`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing scale id in `{value}`"));
    }
    let port: u16 = port
        .trim()
        .parse()
        .map_err(|_| format!("invalid port in `{value}`"))?;
    Ok((id.to_string(), port))
}

fn default_scales() -> Vec<(String, u16)> {
    vec![
        ("SCALE_01".to_string(), 3002),
        ("SCALE_02".to_string(), 3003),
        ("SCALE_03".to_string(), 3004),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();
    let scales = if args.scales.is_empty() {
        default_scales()
    } else {
        args.scales
    };

    let mut simulators = Vec::with_capacity(scales.len());
    for (scale_id, port) in scales {
        let config = SimulatorConfig {
            host: args.host.clone(),
            min_weight: args.min_weight,
            max_weight: args.max_weight,
            reply_delay: Duration::from_millis(args.reply_delay_ms),
            ..SimulatorConfig::new(scale_id, port)
        };
        simulators.push(ScaleSimulator::start(config).await?);
    }
    info!(count = simulators.len(), "all simulators running, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    for simulator in simulators {
        simulator.stop();
    }
    Ok(())
}
