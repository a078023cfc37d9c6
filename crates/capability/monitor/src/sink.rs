//! 事件订阅接口

use async_trait::async_trait;
use domain::WeightReading;
use scale_protocol::{MonitorEvent, ProtocolError};
use tokio::sync::mpsc;

/// 称重事件订阅者
///
/// 由注册表的分发任务按接收顺序调用；同一台秤的事件保持顺序，
/// 不同秤之间无顺序保证。
#[async_trait]
pub trait WeightEventSink: Send + Sync {
    /// 收到有效重量
    async fn weight_received(&self, reading: &WeightReading);

    /// 连接错误（监控会自动重连）
    async fn error(&self, scale_id: &str, error: &ProtocolError) {
        let _ = (scale_id, error);
    }
}

/// 把事件转发到 mpsc 通道的订阅者
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl ChannelSink {
    /// 创建订阅者及其接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl WeightEventSink for ChannelSink {
    async fn weight_received(&self, reading: &WeightReading) {
        let _ = self.tx.send(MonitorEvent::Weight(reading.clone()));
    }

    async fn error(&self, scale_id: &str, error: &ProtocolError) {
        let _ = self.tx.send(MonitorEvent::Error {
            scale_id: scale_id.to_string(),
            error: error.clone(),
        });
    }
}
