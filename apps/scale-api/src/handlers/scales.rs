//! 秤配置 handlers
//!
//! - GET /api/scales - 全部配置（名称 → 配置）
//! - POST /api/scales - 新增或覆盖配置
//! - DELETE /api/scales/:name - 删除配置

use crate::AppState;
use crate::utils::response::{bad_request_error, not_found_error, storage_error};
use crate::utils::{normalize_port, record_to_dto, require_field};
use api_contract::{MessageResponse, ScaleConfigDto, ScaleSavedResponse, UpsertScaleRequest};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scale_store::ScaleRecord;
use std::collections::BTreeMap;

pub async fn list_scales(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(records) => {
            let data: BTreeMap<String, ScaleConfigDto> = records
                .iter()
                .map(|(name, record)| (name.clone(), record_to_dto(record)))
                .collect();
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(err) => storage_error(err),
    }
}

pub async fn upsert_scale(
    State(state): State<AppState>,
    body: Result<Json<UpsertScaleRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    let name = match require_field(req.name) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ip = match require_field(req.ip) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let port = match normalize_port(req.port) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let record = ScaleRecord::new(ip, port, req.description.unwrap_or_default());
    match state.store.upsert(&name, record).await {
        Ok(saved) => (
            StatusCode::OK,
            Json(ScaleSavedResponse {
                message: "Scale configuration saved".to_string(),
                name,
                config: record_to_dto(&saved),
            }),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

pub async fn delete_scale(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.remove(&name).await {
        Ok(true) => (
            StatusCode::OK,
            Json(MessageResponse::new(format!(
                "Scale \"{name}\" configuration deleted"
            ))),
        )
            .into_response(),
        Ok(false) => not_found_error(format!("Scale \"{name}\" not found")),
        Err(err) => storage_error(err),
    }
}
