//! 协议相关类型定义

use crate::error::ProtocolError;
use domain::WeightReading;
use std::time::Duration;

/// 探测帧长度（字节）
pub const PROBE_FRAME_LEN: usize = 256;

/// 断线后重连延迟（毫秒）
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5000;

/// 生成全零探测帧（终端据此返回当前重量）
pub fn probe_frame(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

/// 连接监督参数
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// 断线后重连延迟（固定值，无指数退避）
    pub reconnect_delay: Duration,
    /// 探测帧长度
    pub probe_len: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            probe_len: PROBE_FRAME_LEN,
        }
    }
}

impl MonitorSettings {
    /// 指定重连延迟，其余取默认值
    pub fn with_reconnect_delay(reconnect_delay: Duration) -> Self {
        Self {
            reconnect_delay,
            ..Self::default()
        }
    }
}

/// 监控事件
///
/// 由连接监督任务产生，经注册表转发给订阅者。
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// 解析出有效重量
    Weight(WeightReading),
    /// 连接错误或对端关闭（随后自动重连）
    Error {
        scale_id: String,
        error: ProtocolError,
    },
}

impl MonitorEvent {
    pub fn scale_id(&self) -> &str {
        match self {
            Self::Weight(reading) => &reading.scale_id,
            Self::Error { scale_id, .. } => scale_id,
        }
    }
}
