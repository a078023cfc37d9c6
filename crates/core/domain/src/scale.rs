//! 秤终端相关的领域模型。

use chrono::{DateTime, Utc};
use std::fmt;

/// 秤终端连接配置：标识一台可轮询的秤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleConfig {
    pub id: String,
    pub host: String,
    pub port: u16,
}

impl ScaleConfig {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
        }
    }

    /// `host:port` 形式的连接地址。
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 单秤连接状态。
///
/// `Terminal` 为停止后的吸收态，不会再迁移到其他状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    AwaitingResponse,
    Terminal,
}

impl ConnectionState {
    /// 是否持有活动 socket。
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connected | Self::AwaitingResponse)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::AwaitingResponse => "awaiting_response",
            Self::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// 一次称重读数（只发出，不存储）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightReading {
    pub scale_id: String,
    /// 重量（千克）
    pub weight_kg: u32,
    pub timestamp: DateTime<Utc>,
}

impl WeightReading {
    /// 以当前时间构造读数。
    pub fn now(scale_id: impl Into<String>, weight_kg: u32) -> Self {
        Self {
            scale_id: scale_id.into(),
            weight_kg,
            timestamp: Utc::now(),
        }
    }
}
