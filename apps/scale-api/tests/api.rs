use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use scale_api::{AppState, app};
use scale_monitor::RequestSettings;
use scale_protocol::MonitorSettings;
use scale_simulator::{ScaleSimulator, SimulatorConfig};
use scale_store::{InMemoryScaleStore, JsonFileScaleStore, ScaleRecord, ScaleStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn request_settings() -> RequestSettings {
    RequestSettings {
        timeout: Duration::from_millis(500),
        monitor: MonitorSettings::with_reconnect_delay(Duration::from_millis(200)),
    }
}

fn test_app(store: Arc<dyn ScaleStore>) -> Router {
    app(AppState::new(store, request_settings()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_carries_request_ids() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn post_requires_name_ip_and_port() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));
    let expected = json!({ "error": "Missing required fields: name, ip, and port are required" });

    for body in [
        json!({ "ip": "10.0.0.1", "port": 3002 }),
        json!({ "name": "SCALE_01", "port": 3002 }),
        json!({ "name": "SCALE_01", "ip": "10.0.0.1" }),
        json!({ "name": "SCALE_01", "ip": "10.0.0.1", "port": 0 }),
        json!({ "name": "  ", "ip": "10.0.0.1", "port": 3002 }),
    ] {
        let (status, value) = send(&app, Method::POST, "/api/scales", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, expected);
    }

    let (status, value) = send(
        &app,
        Method::POST,
        "/api/scales",
        Some(json!({ "name": "SCALE_01", "ip": "10.0.0.1", "port": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].is_string());

    let (_, list) = send(&app, Method::GET, "/api/scales", None).await;
    assert_eq!(list, json!({}));
}

#[tokio::test]
async fn post_list_delete_round() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));

    let (status, saved) = send(
        &app,
        Method::POST,
        "/api/scales",
        Some(json!({ "name": "SCALE_01", "ip": "192.168.1.10", "port": "3002" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["message"], "Scale configuration saved");
    assert_eq!(saved["name"], "SCALE_01");
    assert_eq!(saved["config"]["ip"], "192.168.1.10");
    assert_eq!(saved["config"]["port"], 3002);
    assert_eq!(saved["config"]["description"], "");
    let updated_at = saved["config"]["updatedAt"].as_str().expect("updatedAt");
    assert!(updated_at.ends_with('Z'));
    assert_eq!(updated_at.len(), "2024-05-01T08:30:00.123Z".len());

    let (status, list) = send(&app, Method::GET, "/api/scales", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["SCALE_01"]["port"], 3002);

    let (status, value) = send(&app, Method::DELETE, "/api/scales/SCALE_01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({ "message": "Scale \"SCALE_01\" configuration deleted" })
    );

    let (status, value) = send(&app, Method::DELETE, "/api/scales/SCALE_01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "Scale \"SCALE_01\" not found" }));
}

#[tokio::test]
async fn name_is_stored_as_submitted() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));

    let (status, saved) = send(
        &app,
        Method::POST,
        "/api/scales",
        Some(json!({ "name": " SCALE_01 ", "ip": "192.168.1.10", "port": 3002 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["name"], " SCALE_01 ");

    let (_, list) = send(&app, Method::GET, "/api/scales", None).await;
    assert!(list.get(" SCALE_01 ").is_some());
    assert!(list.get("SCALE_01").is_none());

    let (status, _) = send(&app, Method::DELETE, "/api/scales/%20SCALE_01%20", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_scale_weight_is_not_found() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));
    let (status, value) = send(&app, Method::GET, "/api/weight/SCALE_99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        value,
        json!({ "error": "Scale \"SCALE_99\" not found in configuration" })
    );
}

#[tokio::test]
async fn weight_from_simulator() {
    let simulator = ScaleSimulator::start(SimulatorConfig {
        host: "127.0.0.1".to_string(),
        reply_delay: Duration::from_millis(20),
        ..SimulatorConfig::new("SCALE_01", 0)
    })
    .await
    .expect("simulator");
    let store = Arc::new(InMemoryScaleStore::new());
    store
        .upsert(
            "SCALE_01",
            ScaleRecord::new("127.0.0.1", simulator.port(), "loopback"),
        )
        .await
        .expect("upsert");
    let app = test_app(store);

    let (status, value) = send(&app, Method::GET, "/api/weight/SCALE_01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["name"], "SCALE_01");
    assert_eq!(value["unit"], "kg");
    let weight = value["weight"].as_u64().expect("weight");
    assert!((1000..=9999).contains(&weight));
    assert!(value["timestamp"].as_str().expect("timestamp").ends_with('Z'));
}

#[tokio::test]
async fn unreachable_scale_is_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let store = Arc::new(InMemoryScaleStore::new());
    store
        .upsert("SCALE_01", ScaleRecord::new("127.0.0.1", port, ""))
        .await
        .expect("upsert");
    let app = test_app(store);

    let (status, value) = send(&app, Method::GET, "/api/weight/SCALE_01", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!value["error"].as_str().expect("error").is_empty());
}

#[tokio::test]
async fn silent_scale_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let store = Arc::new(InMemoryScaleStore::new());
    store
        .upsert("SCALE_01", ScaleRecord::new("127.0.0.1", port, ""))
        .await
        .expect("upsert");
    let app = test_app(store);

    let (status, value) = send(&app, Method::GET, "/api/weight/SCALE_01", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({ "error": "Operation timed out" }));
    drop(listener);
}

#[tokio::test]
async fn configuration_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scale-config.json");

    let app = test_app(Arc::new(JsonFileScaleStore::open(&path).await.expect("open")));
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/scales",
        Some(json!({
            "name": "SCALE_02",
            "ip": "192.168.1.11",
            "port": 3003,
            "description": "loading bay"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let restarted = test_app(Arc::new(JsonFileScaleStore::open(&path).await.expect("reopen")));
    let (_, list) = send(&restarted, Method::GET, "/api/scales", None).await;
    assert_eq!(list["SCALE_02"]["description"], "loading bay");
    assert_eq!(list["SCALE_02"]["port"], 3003);
}

#[tokio::test]
async fn metrics_snapshot() {
    let app = test_app(Arc::new(InMemoryScaleStore::new()));
    let (status, value) = send(&app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(value["readingsReceived"].is_u64());
    assert!(value["weightRequestsTimedOut"].is_u64());
}
