//! 单秤连接监督
//!
//! 每台秤一个后台任务，循环执行：连接 → 发送探测帧 → 等待响应 → 断线后固定延迟重连。
//!
//! ## 状态迁移
//!
//! ```text
//! Disconnected ──start / 重连定时到期──▶ Connecting ──握手成功──▶ Connected
//!                                                                 │ 发送探测帧
//!                                                                 ▼
//!      ◀──────────── socket 错误 / 对端关闭 ──────────────── AwaitingResponse ⟲ 有效重量：发事件 + 再探测
//!                                                                          ⟲ 无法解析：仅记录日志
//! 任意状态 ──stop()──▶ Terminal（吸收态）
//! ```
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let running = Arc::new(AtomicBool::new(true));
//! let mut supervisor = ConnectionSupervisor::spawn(
//!     ScaleConfig::new("SCALE_01", "127.0.0.1", 3002),
//!     MonitorSettings::default(),
//!     running,
//!     ConnectionTable::new(),
//!     tx,
//! );
//! while let Some(event) = rx.recv().await { /* ... */ }
//! supervisor.stop();
//! ```

use crate::error::ProtocolError;
use crate::parser::parse_weight;
use crate::types::{MonitorEvent, MonitorSettings, probe_frame};
use domain::{ConnectionState, ScaleConfig, WeightReading};
use scale_telemetry::{
    record_connect_failure, record_reading_received, record_reconnect_scheduled,
    record_unparsed_frame,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 单次读取缓冲区大小
const READ_BUFFER_SIZE: usize = 1024;

/// 活动连接表
///
/// 每台秤占一个槽位，仅由该秤自己的监督任务写入（stop 时由注册表清空）。
/// 插入/删除都是低频的生命周期事件，一把粗粒度锁即可。
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    inner: Arc<Mutex<HashMap<String, ConnectionState>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ConnectionState>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 查询指定秤的活动连接状态
    pub fn get(&self, scale_id: &str) -> Option<ConnectionState> {
        self.lock().get(scale_id).copied()
    }

    /// 活动连接快照
    pub fn snapshot(&self) -> HashMap<String, ConnectionState> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 清空所有槽位
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, scale_id: &str, state: ConnectionState) {
        let mut map = self.lock();
        if state.is_live() {
            map.insert(scale_id.to_string(), state);
        } else {
            map.remove(scale_id);
        }
    }
}

/// 单秤连接监督器
///
/// 持有后台任务句柄与状态通道。`stop()` 之后进入 `Terminal`，不再有任何动作。
pub struct ConnectionSupervisor {
    scale_id: String,
    state: Arc<watch::Sender<ConnectionState>>,
    connections: ConnectionTable,
    handle: Option<JoinHandle<()>>,
}

impl ConnectionSupervisor {
    /// 启动监督任务（需在 tokio 运行时内调用）
    ///
    /// `running` 为注册表的运行标志：为 false 时不再发起连接。
    pub fn spawn(
        config: ScaleConfig,
        settings: MonitorSettings,
        running: Arc<AtomicBool>,
        connections: ConnectionTable,
        events: mpsc::UnboundedSender<MonitorEvent>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let state = Arc::new(state);
        let scale_id = config.id.clone();
        let task = SupervisorTask {
            config,
            settings,
            running,
            connections: connections.clone(),
            events,
            state: Arc::clone(&state),
        };
        let handle = tokio::spawn(task.run());
        Self {
            scale_id,
            state,
            connections,
            handle: Some(handle),
        }
    }

    pub fn scale_id(&self) -> &str {
        &self.scale_id
    }

    /// 当前状态
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// 订阅状态变化
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// 立即停止：销毁 socket、取消重连定时器，进入 `Terminal`
    ///
    /// 可重复调用。
    pub fn stop(&mut self) {
        let stopped = self.state.send_if_modified(|current| {
            if *current == ConnectionState::Terminal {
                return false;
            }
            self.connections
                .record(&self.scale_id, ConnectionState::Terminal);
            *current = ConnectionState::Terminal;
            true
        });
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if stopped {
            info!(scale_id = %self.scale_id, "scale supervisor stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == ConnectionState::Terminal
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 后台任务体
struct SupervisorTask {
    config: ScaleConfig,
    settings: MonitorSettings,
    running: Arc<AtomicBool>,
    connections: ConnectionTable,
    events: mpsc::UnboundedSender<MonitorEvent>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl SupervisorTask {
    /// 连接/重连主循环
    async fn run(self) {
        let addr = self.config.addr();
        loop {
            if !self.running.load(Ordering::SeqCst) || !self.transition(ConnectionState::Connecting)
            {
                break;
            }
            info!(scale_id = %self.config.id, addr = %addr, "connecting to scale");

            let err = match self.session(&addr).await {
                Ok(()) => break,
                Err(err) => err,
            };

            if !self.transition(ConnectionState::Disconnected) {
                break;
            }
            warn!(scale_id = %self.config.id, addr = %addr, error = %err, "scale connection lost");
            self.emit(MonitorEvent::Error {
                scale_id: self.config.id.clone(),
                error: err,
            });

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            record_reconnect_scheduled();
            info!(
                scale_id = %self.config.id,
                "reconnecting in {}ms",
                self.settings.reconnect_delay.as_millis()
            );
            tokio::time::sleep(self.settings.reconnect_delay).await;
        }
        debug!(scale_id = %self.config.id, "scale supervisor task finished");
    }

    /// 单次连接会话
    ///
    /// 仅在被停止时返回 `Ok(())`；socket 错误或对端关闭返回 `Err`。
    async fn session(&self, addr: &str) -> Result<(), ProtocolError> {
        let stream = match TcpStream::connect(addr).await {
            Ok(stream) => stream,
            Err(err) => {
                record_connect_failure();
                return Err(ProtocolError::Connection(format!(
                    "failed to connect to {addr}: {err}"
                )));
            }
        };
        if !self.transition(ConnectionState::Connected) {
            return Ok(());
        }
        info!(scale_id = %self.config.id, addr = %addr, "connected to scale");

        let (mut reader, mut writer) = stream.into_split();
        let probe = probe_frame(self.settings.probe_len);
        if !self.send_probe(&mut writer, &probe).await? {
            return Ok(());
        }

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Err(ProtocolError::Connection(
                    "connection closed by terminal".to_string(),
                ));
            }

            let Some(weight_kg) = parse_weight(&buf[..n]) else {
                // 无法解析：保持连接，不再发送探测帧，等待下一块数据
                record_unparsed_frame();
                debug!(
                    scale_id = %self.config.id,
                    response = %String::from_utf8_lossy(&buf[..n]).trim(),
                    "unrecognized scale response"
                );
                continue;
            };

            record_reading_received();
            debug!(scale_id = %self.config.id, weight_kg, "weight received");
            self.emit(MonitorEvent::Weight(WeightReading::now(
                self.config.id.clone(),
                weight_kg,
            )));

            // 收到有效响应后立即发起下一轮轮询
            if !self.send_probe(&mut writer, &probe).await? {
                return Ok(());
            }
        }
    }

    /// 发送探测帧并进入 `AwaitingResponse`
    ///
    /// 已停止时返回 `Ok(false)`。
    async fn send_probe(
        &self,
        writer: &mut OwnedWriteHalf,
        probe: &[u8],
    ) -> Result<bool, ProtocolError> {
        writer.write_all(probe).await?;
        writer.flush().await?;
        Ok(self.transition(ConnectionState::AwaitingResponse))
    }

    /// 状态迁移，同时维护连接表中本秤的槽位
    ///
    /// 已处于 `Terminal` 时拒绝迁移并返回 false。
    fn transition(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|current| {
            if *current == ConnectionState::Terminal {
                return false;
            }
            self.connections.record(&self.config.id, next);
            *current = next;
            true
        })
    }

    fn emit(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            debug!(scale_id = %self.config.id, "event receiver dropped");
        }
    }
}
