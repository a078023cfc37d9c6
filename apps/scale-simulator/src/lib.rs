//! 秤终端模拟器
//!
//! 每个模拟器监听一个端口；连接上每收到一块数据（探测帧），
//! 等待一小段处理时间后回复一帧 `ST,GS,+,<7 位重量>kg\r\n`。

use rand::Rng;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// 模拟器配置
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub scale_id: String,
    pub host: String,
    /// 0 表示由系统分配端口
    pub port: u16,
    /// 最小重量（千克）
    pub min_weight: u32,
    /// 最大重量（千克）
    pub max_weight: u32,
    /// 模拟终端处理耗时
    pub reply_delay: Duration,
}

impl SimulatorConfig {
    pub fn new(scale_id: impl Into<String>, port: u16) -> Self {
        Self {
            scale_id: scale_id.into(),
            host: "0.0.0.0".to_string(),
            port,
            min_weight: 1000,
            max_weight: 9999,
            reply_delay: Duration::from_millis(100),
        }
    }
}

/// 生成 `[min, max]` 区间内的随机重量
///
/// `min > max` 时 panic；[`ScaleSimulator::start`] 会先拒绝这种配置。
pub fn generate_weight(min: u32, max: u32) -> u32 {
    rand::thread_rng().gen_range(min..=max)
}

/// 格式化响应帧
pub fn format_frame(weight: u32) -> String {
    format!("ST,GS,+,{weight:07}kg\r\n")
}

/// 运行中的模拟器，drop 或 `stop()` 时关闭监听及所有连接
pub struct ScaleSimulator {
    scale_id: String,
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ScaleSimulator {
    /// 绑定端口并开始接受连接
    pub async fn start(config: SimulatorConfig) -> io::Result<Self> {
        if config.min_weight > config.max_weight {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "min weight {} exceeds max weight {}",
                    config.min_weight, config.max_weight
                ),
            ));
        }
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        info!(scale_id = %config.scale_id, addr = %local_addr, "scale simulator running");
        let scale_id = config.scale_id.clone();
        let handle = tokio::spawn(accept_loop(listener, config));
        Ok(Self {
            scale_id,
            local_addr,
            handle,
        })
    }

    pub fn scale_id(&self) -> &str {
        &self.scale_id
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn stop(self) {
        info!(scale_id = %self.scale_id, "scale simulator stopped");
    }
}

impl Drop for ScaleSimulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn accept_loop(listener: TcpListener, config: SimulatorConfig) {
    // 连接任务归属于本任务，监听任务被取消时一并取消
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!(scale_id = %config.scale_id, peer = %peer, "client connected");
                    connections.spawn(serve_client(stream, config.clone()));
                }
                Err(err) => warn!(scale_id = %config.scale_id, error = %err, "accept failed"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

async fn serve_client(mut stream: TcpStream, config: SimulatorConfig) {
    let mut buf = vec![0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                tokio::time::sleep(config.reply_delay).await;
                let frame = format_frame(generate_weight(config.min_weight, config.max_weight));
                debug!(scale_id = %config.scale_id, frame = %frame.trim(), "sending weight");
                if let Err(err) = stream.write_all(frame.as_bytes()).await {
                    warn!(scale_id = %config.scale_id, error = %err, "write failed");
                    break;
                }
            }
            Err(err) => {
                warn!(scale_id = %config.scale_id, error = %err, "socket error");
                break;
            }
        }
    }
    info!(scale_id = %config.scale_id, "client disconnected");
}
