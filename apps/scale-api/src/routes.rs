//! 路由定义
//!
//! - 健康检查：/health
//! - 秤配置：/api/scales, /api/scales/:name
//! - 单次称重：/api/weight/:name
//! - 计数器：/api/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{delete, get},
};

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/scales", get(list_scales).post(upsert_scale))
        .route("/api/scales/:name", delete(delete_scale))
        .route("/api/weight/:name", get(get_weight))
        .route("/api/metrics", get(get_metrics))
}
