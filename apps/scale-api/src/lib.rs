//! 秤 HTTP API
//!
//! - 秤配置 CRUD（持久化到 JSON 文件）
//! - 按名称单次读取当前重量
//! - 健康检查与运行计数器

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::{Router, middleware::from_fn};
use scale_monitor::RequestSettings;
use scale_store::ScaleStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScaleStore>,
    /// 单次称重请求的超时与重连参数
    pub request: RequestSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn ScaleStore>, request: RequestSettings) -> Self {
        Self { store, request }
    }
}

/// 组装完整应用（路由 + 中间件）
pub fn app(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(from_fn(middleware::request_context))
}
