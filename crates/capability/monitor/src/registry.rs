//! 多秤监控注册表
//!
//! 持有 `秤 ID → 配置` 与 `秤 ID → 连接监督器` 两张表，统一启动/停止所有秤。
//!
//! 事件流：各监督器 → mpsc 通道 → 分发任务 → 已订阅的 [`WeightEventSink`]。

use crate::sink::WeightEventSink;
use domain::{ConnectionState, ScaleConfig};
use scale_protocol::{ConnectionSupervisor, ConnectionTable, MonitorEvent, MonitorSettings};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

type SinkList = Arc<RwLock<Vec<Arc<dyn WeightEventSink>>>>;

/// 多秤监控注册表
///
/// 所有方法只需 `&self`，可通过 `Arc` 在多处共享。
/// `start_monitoring` 需在 tokio 运行时内调用。
pub struct MonitorRegistry {
    settings: MonitorSettings,
    scales: Mutex<HashMap<String, ScaleConfig>>,
    supervisors: Mutex<HashMap<String, ConnectionSupervisor>>,
    connections: ConnectionTable,
    running: Arc<AtomicBool>,
    sinks: SinkList,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::with_settings(MonitorSettings::default())
    }

    pub fn with_settings(settings: MonitorSettings) -> Self {
        Self {
            settings,
            scales: Mutex::new(HashMap::new()),
            supervisors: Mutex::new(HashMap::new()),
            connections: ConnectionTable::new(),
            running: Arc::new(AtomicBool::new(false)),
            sinks: Arc::new(RwLock::new(Vec::new())),
            dispatcher: Mutex::new(None),
        }
    }

    /// 注册或覆盖秤配置
    ///
    /// 不会重启或重配置已在运行的监督器，新配置在下一次 stop/start 后生效。
    pub fn add_scale(&self, config: ScaleConfig) {
        debug!(scale_id = %config.id, addr = %config.addr(), "scale registered");
        lock(&self.scales).insert(config.id.clone(), config);
    }

    /// 移除秤配置；运行中的监督器保留到下一次 stop
    pub fn remove_scale(&self, scale_id: &str) -> Option<ScaleConfig> {
        lock(&self.scales).remove(scale_id)
    }

    pub fn scale(&self, scale_id: &str) -> Option<ScaleConfig> {
        lock(&self.scales).get(scale_id).cloned()
    }

    /// 已注册的秤 ID（按字典序）
    pub fn scale_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.scales).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// 订阅事件
    pub fn subscribe(&self, sink: Arc<dyn WeightEventSink>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 活动连接快照（仅包含持有 socket 的秤）
    pub fn connection_states(&self) -> HashMap<String, ConnectionState> {
        self.connections.snapshot()
    }

    /// 启动监控：为每个已注册配置启动一个监督器
    ///
    /// 已在运行时为空操作。
    pub fn start_monitoring(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(rx, Arc::clone(&self.sinks)));
        if let Some(previous) = lock(&self.dispatcher).replace(dispatcher) {
            previous.abort();
        }

        let configs: Vec<ScaleConfig> = lock(&self.scales).values().cloned().collect();
        let mut supervisors = lock(&self.supervisors);
        for config in configs {
            let scale_id = config.id.clone();
            let supervisor = ConnectionSupervisor::spawn(
                config,
                self.settings.clone(),
                Arc::clone(&self.running),
                self.connections.clone(),
                tx.clone(),
            );
            supervisors.insert(scale_id, supervisor);
        }
        info!(scales = supervisors.len(), "scale monitoring started");
    }

    /// 停止监控：立即销毁所有 socket、取消重连定时器、清空活动连接表
    ///
    /// 可重复调用；已注册的配置保留，下一次 start 复用。
    pub fn stop_monitoring(&self) {
        let was_running = self.running.swap(false, Ordering::SeqCst);

        let stopped: Vec<ConnectionSupervisor> =
            lock(&self.supervisors).drain().map(|(_, sup)| sup).collect();
        for mut supervisor in stopped {
            supervisor.stop();
        }
        self.connections.clear();

        if let Some(dispatcher) = lock(&self.dispatcher).take() {
            dispatcher.abort();
        }
        if was_running {
            info!("scale monitoring stopped");
        }
    }
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MonitorRegistry {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

/// 分发任务：按接收顺序把事件转发给所有订阅者
async fn dispatch(mut rx: mpsc::UnboundedReceiver<MonitorEvent>, sinks: SinkList) {
    while let Some(event) = rx.recv().await {
        let targets: Vec<Arc<dyn WeightEventSink>> = sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for sink in targets {
            match &event {
                MonitorEvent::Weight(reading) => sink.weight_received(reading).await,
                MonitorEvent::Error { scale_id, error } => sink.error(scale_id, error).await,
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
