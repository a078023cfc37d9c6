//! 秤 HTTP API 的请求/响应契约。
//!
//! 响应体沿用既有客户端依赖的形状：失败为 `{ "error": ... }`，
//! 成功时直接返回数据或 `{ "message": ... }`。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 失败响应体。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// 仅含提示信息的响应体。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 新增/覆盖秤配置的请求体。
///
/// 字段全部可选，由处理器统一校验；`port` 允许数字或数字字符串。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertScaleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 秤配置（`GET /api/scales` 的值、保存响应中的 `config`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConfigDto {
    pub ip: String,
    pub port: u16,
    pub description: String,
    pub updated_at: String,
}

/// 保存成功响应。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleSavedResponse {
    pub message: String,
    pub name: String,
    pub config: ScaleConfigDto,
}

/// 单次称重结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightResponse {
    pub name: String,
    pub weight: u32,
    /// ISO-8601 UTC，毫秒精度
    pub timestamp: String,
    pub unit: String,
}

/// 运行计数器快照。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub readings_received: u64,
    pub unparsed_frames: u64,
    pub connect_failures: u64,
    pub reconnects_scheduled: u64,
    pub weight_requests_ok: u64,
    pub weight_requests_failed: u64,
    pub weight_requests_timed_out: u64,
}
