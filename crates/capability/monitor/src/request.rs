//! 单次称重请求
//!
//! 为一台秤临时组装一个注册表，等待第一条读数或错误，或固定超时，然后立即拆除。
//! 无论底层监督器之后还会产生多少事件，调用方只会得到一个结果。

use crate::registry::MonitorRegistry;
use crate::sink::WeightEventSink;
use async_trait::async_trait;
use domain::{ScaleConfig, WeightReading};
use scale_protocol::{MonitorSettings, ProtocolError};
use scale_telemetry::{
    record_weight_request_failed, record_weight_request_ok, record_weight_request_timed_out,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{info, warn};

/// 单次请求默认超时（毫秒）
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

type Outcome = Result<WeightReading, ProtocolError>;

/// 单次称重请求参数
#[derive(Debug, Clone)]
pub struct RequestSettings {
    /// 从请求开始计时的超时
    pub timeout: Duration,
    pub monitor: MonitorSettings,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            monitor: MonitorSettings::default(),
        }
    }
}

/// 使用默认参数请求一次当前重量
pub async fn request_weight(host: &str, port: u16, scale_id: &str) -> Outcome {
    request_weight_with(
        ScaleConfig::new(scale_id, host, port),
        &RequestSettings::default(),
    )
    .await
}

/// 请求一次当前重量
///
/// 返回第一条读数、第一个连接错误或 [`ProtocolError::Timeout`] 之一；
/// 返回前监督器已停止（socket 已关闭）。
pub async fn request_weight_with(config: ScaleConfig, settings: &RequestSettings) -> Outcome {
    let deadline = Instant::now() + settings.timeout;
    let scale_id = config.id.clone();
    let (tx, rx) = oneshot::channel();

    let registry = MonitorRegistry::with_settings(settings.monitor.clone());
    registry.add_scale(config);
    registry.subscribe(Arc::new(FirstOutcome::new(tx)));
    registry.start_monitoring();

    let outcome = tokio::time::timeout_at(deadline, rx).await;
    registry.stop_monitoring();

    match outcome {
        Ok(Ok(Ok(reading))) => {
            record_weight_request_ok();
            info!(scale_id = %scale_id, weight_kg = reading.weight_kg, "weight request completed");
            Ok(reading)
        }
        Ok(Ok(Err(err))) => {
            record_weight_request_failed();
            warn!(scale_id = %scale_id, error = %err, "weight request failed");
            Err(err)
        }
        Ok(Err(_)) => {
            record_weight_request_failed();
            Err(ProtocolError::ChannelClosed)
        }
        Err(_) => {
            record_weight_request_timed_out();
            warn!(scale_id = %scale_id, timeout = ?settings.timeout, "weight request timed out");
            Err(ProtocolError::Timeout)
        }
    }
}

/// 只接收第一个结果的订阅者
struct FirstOutcome {
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl FirstOutcome {
    fn new(tx: oneshot::Sender<Outcome>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn resolve(&self, outcome: Outcome) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }
}

#[async_trait]
impl WeightEventSink for FirstOutcome {
    async fn weight_received(&self, reading: &WeightReading) {
        self.resolve(Ok(reading.clone()));
    }

    async fn error(&self, _scale_id: &str, error: &ProtocolError) {
        self.resolve(Err(error.clone()));
    }
}
