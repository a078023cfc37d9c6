//! 追踪、请求 ID 生成与运行计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub readings_received: u64,
    pub unparsed_frames: u64,
    pub connect_failures: u64,
    pub reconnects_scheduled: u64,
    pub weight_requests_ok: u64,
    pub weight_requests_failed: u64,
    pub weight_requests_timed_out: u64,
}

/// 进程级运行计数器。
pub struct TelemetryMetrics {
    readings_received: AtomicU64,
    unparsed_frames: AtomicU64,
    connect_failures: AtomicU64,
    reconnects_scheduled: AtomicU64,
    weight_requests_ok: AtomicU64,
    weight_requests_failed: AtomicU64,
    weight_requests_timed_out: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            readings_received: AtomicU64::new(0),
            unparsed_frames: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            reconnects_scheduled: AtomicU64::new(0),
            weight_requests_ok: AtomicU64::new(0),
            weight_requests_failed: AtomicU64::new(0),
            weight_requests_timed_out: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_received: self.readings_received.load(Ordering::Relaxed),
            unparsed_frames: self.unparsed_frames.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            reconnects_scheduled: self.reconnects_scheduled.load(Ordering::Relaxed),
            weight_requests_ok: self.weight_requests_ok.load(Ordering::Relaxed),
            weight_requests_failed: self.weight_requests_failed.load(Ordering::Relaxed),
            weight_requests_timed_out: self.weight_requests_timed_out.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录解析成功的称重读数。
pub fn record_reading_received() {
    metrics().readings_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录无法解析的响应块。
pub fn record_unparsed_frame() {
    metrics().unparsed_frames.fetch_add(1, Ordering::Relaxed);
}

/// 记录 TCP 连接失败。
pub fn record_connect_failure() {
    metrics().connect_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录已安排的重连。
pub fn record_reconnect_scheduled() {
    metrics().reconnects_scheduled.fetch_add(1, Ordering::Relaxed);
}

/// 记录单次称重请求成功。
pub fn record_weight_request_ok() {
    metrics().weight_requests_ok.fetch_add(1, Ordering::Relaxed);
}

/// 记录单次称重请求失败（连接错误）。
pub fn record_weight_request_failed() {
    metrics()
        .weight_requests_failed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录单次称重请求超时。
pub fn record_weight_request_timed_out() {
    metrics()
        .weight_requests_timed_out
        .fetch_add(1, Ordering::Relaxed);
}
