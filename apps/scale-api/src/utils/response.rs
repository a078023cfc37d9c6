//! HTTP 响应辅助函数和 DTO 转换
//!
//! 失败响应统一为 `{ "error": "<message>" }`。

use api_contract::{ErrorResponse, ScaleConfigDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::to_iso_millis;
use scale_protocol::ProtocolError;
use scale_store::{ScaleRecord, StoreError};
use tracing::error;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub fn not_found_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, message)
}

/// 存储错误响应
pub fn storage_error(err: StoreError) -> Response {
    error!(error = %err, "scale config store failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// 单次称重失败（连接错误或超时）
pub fn weight_error(name: &str, err: ProtocolError) -> Response {
    error!(scale = %name, error = %err, "error getting weight");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// ScaleRecord 转 ScaleConfigDto
pub fn record_to_dto(record: &ScaleRecord) -> ScaleConfigDto {
    ScaleConfigDto {
        ip: record.ip.clone(),
        port: record.port,
        description: record.description.clone(),
        updated_at: to_iso_millis(&record.updated_at),
    }
}
