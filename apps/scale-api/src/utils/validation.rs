//! 输入验证辅助函数
//!
//! `name`、`ip`、`port` 任一缺失、为空或为 0 时统一返回同一条 400 提示；
//! `port` 可为数字或数字字符串，非数字或超出范围同样是 400。

use crate::utils::response::bad_request_error;
use axum::response::Response;
use serde_json::Value;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: name, ip, and port are required";

pub const INVALID_PORT_MESSAGE: &str = "Invalid port: expected an integer between 1 and 65535";

/// 必填字符串字段：去除首尾空格后非空，返回原值
pub fn require_field(value: Option<String>) -> Result<String, Response> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(bad_request_error(MISSING_FIELDS_MESSAGE)),
    }
}

/// 端口：数字或数字字符串
pub fn normalize_port(value: Option<Value>) -> Result<u16, Response> {
    let raw = match value {
        None | Some(Value::Null) => return Err(bad_request_error(MISSING_FIELDS_MESSAGE)),
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(bad_request_error(MISSING_FIELDS_MESSAGE));
            }
            text.parse::<u64>().ok()
        }
        Some(_) => None,
    };

    match raw {
        Some(0) => Err(bad_request_error(MISSING_FIELDS_MESSAGE)),
        Some(port) => u16::try_from(port).map_err(|_| bad_request_error(INVALID_PORT_MESSAGE)),
        None => Err(bad_request_error(INVALID_PORT_MESSAGE)),
    }
}
