//! 单次称重
//!
//! - GET /api/weight/:name
//!
//! 按名称查找配置后发起一次请求：连接、探测、等待首个读数或错误，超时后失败。
//! 未配置的名称直接 404，不做任何网络访问。

use crate::AppState;
use crate::utils::response::{not_found_error, storage_error, weight_error};
use api_contract::WeightResponse;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::to_iso_millis;
use scale_monitor::request_weight_with;

pub async fn get_weight(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let record = match state.store.get(&name).await {
        Ok(Some(record)) => record,
        Ok(None) => return not_found_error(format!("Scale \"{name}\" not found in configuration")),
        Err(err) => return storage_error(err),
    };

    match request_weight_with(record.to_scale_config(&name), &state.request).await {
        Ok(reading) => (
            StatusCode::OK,
            Json(WeightResponse {
                name: reading.scale_id,
                weight: reading.weight_kg,
                timestamp: to_iso_millis(&reading.timestamp),
                unit: "kg".to_string(),
            }),
        )
            .into_response(),
        Err(err) => weight_error(&name, err),
    }
}
