//! 运行计数器快照
//!
//! - GET /api/metrics

use api_contract::MetricsResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scale_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(MetricsResponse {
            readings_received: snapshot.readings_received,
            unparsed_frames: snapshot.unparsed_frames,
            connect_failures: snapshot.connect_failures,
            reconnects_scheduled: snapshot.reconnects_scheduled,
            weight_requests_ok: snapshot.weight_requests_ok,
            weight_requests_failed: snapshot.weight_requests_failed,
            weight_requests_timed_out: snapshot.weight_requests_timed_out,
        }),
    )
        .into_response()
}
