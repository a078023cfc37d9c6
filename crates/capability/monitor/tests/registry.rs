use domain::{ConnectionState, ScaleConfig, WeightReading};
use scale_monitor::{ChannelSink, MonitorRegistry, WeightEventSink};
use scale_protocol::{MonitorEvent, MonitorSettings, ProtocolError};
use scale_simulator::{ScaleSimulator, SimulatorConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

const RECONNECT_DELAY: Duration = Duration::from_millis(200);

fn registry() -> MonitorRegistry {
    MonitorRegistry::with_settings(MonitorSettings::with_reconnect_delay(RECONNECT_DELAY))
}

async fn simulator(scale_id: &str) -> ScaleSimulator {
    let config = SimulatorConfig {
        host: "127.0.0.1".to_string(),
        reply_delay: Duration::from_millis(20),
        ..SimulatorConfig::new(scale_id, 0)
    };
    ScaleSimulator::start(config).await.expect("simulator")
}

/// 绑定后立即释放的端口，连接会被拒绝
async fn unreachable_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("addr").port()
}

async fn accept(listener: &TcpListener) -> TcpStream {
    let (stream, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("accept in time")
        .expect("accept");
    stream
}

async fn next_weight(
    rx: &mut mpsc::UnboundedReceiver<MonitorEvent>,
    scale_id: &str,
) -> WeightReading {
    timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await.expect("event") {
                MonitorEvent::Weight(reading) if reading.scale_id == scale_id => return reading,
                _ => continue,
            }
        }
    })
    .await
    .expect("weight in time")
}

#[tokio::test]
async fn failing_scale_does_not_affect_healthy_one() {
    let healthy = simulator("SCALE_02").await;
    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", unreachable_port().await));
    registry.add_scale(ScaleConfig::new("SCALE_02", "127.0.0.1", healthy.port()));
    let (sink, mut rx) = ChannelSink::channel();
    registry.subscribe(Arc::new(sink));

    registry.start_monitoring();
    assert!(registry.is_running());

    // 健康秤持续产出读数，同时故障秤持续上报错误
    let mut readings = 0;
    let mut errors = 0;
    timeout(Duration::from_secs(5), async {
        while readings < 3 || errors < 2 {
            match rx.recv().await.expect("event") {
                MonitorEvent::Weight(reading) => {
                    assert_eq!(reading.scale_id, "SCALE_02");
                    assert!((1000..=9999).contains(&reading.weight_kg));
                    readings += 1;
                }
                MonitorEvent::Error { scale_id, .. } => {
                    assert_eq!(scale_id, "SCALE_01");
                    errors += 1;
                }
            }
        }
    })
    .await
    .expect("events in time");

    let states = registry.connection_states();
    assert!(!states.contains_key("SCALE_01"));
    assert!(states.contains_key("SCALE_02"));

    registry.stop_monitoring();
    assert!(!registry.is_running());
    assert!(registry.connection_states().is_empty());
}

#[tokio::test]
async fn stop_then_start_reuses_configs() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", port));

    registry.start_monitoring();
    let mut first = accept(&listener).await;

    registry.stop_monitoring();
    assert!(registry.connection_states().is_empty());
    assert_eq!(registry.scale_ids(), vec!["SCALE_01".to_string()]);

    // 停止后 socket 被销毁，对端读到 EOF（先读掉探测帧）
    let mut buf = vec![0u8; 1024];
    let closed = timeout(Duration::from_secs(5), async {
        loop {
            match first.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "socket should be closed after stop");

    // 停止期间不会重连
    let reconnect = timeout(RECONNECT_DELAY * 3, listener.accept()).await;
    assert!(reconnect.is_err());

    registry.start_monitoring();
    let _second = accept(&listener).await;
    registry.stop_monitoring();
}

#[tokio::test]
async fn start_twice_opens_single_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", port));

    registry.start_monitoring();
    registry.start_monitoring();
    let _terminal = accept(&listener).await;

    let extra = timeout(Duration::from_millis(300), listener.accept()).await;
    assert!(extra.is_err(), "second start must be a no-op");
    registry.stop_monitoring();
}

#[tokio::test]
async fn config_change_applies_after_restart() {
    let old_terminal = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let new_terminal = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let old_port = old_terminal.local_addr().expect("addr").port();
    let new_port = new_terminal.local_addr().expect("addr").port();

    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", old_port));
    registry.start_monitoring();
    let _old = accept(&old_terminal).await;

    // 运行中覆盖配置不会重配置现有监督器
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", new_port));
    let early = timeout(Duration::from_millis(300), new_terminal.accept()).await;
    assert!(early.is_err());

    registry.stop_monitoring();
    registry.start_monitoring();
    let _new = accept(&new_terminal).await;
    registry.stop_monitoring();
}

#[tokio::test]
async fn connected_states_are_reported() {
    let sim = simulator("SCALE_03").await;
    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_03", "127.0.0.1", sim.port()));
    let (sink, mut rx) = ChannelSink::channel();
    registry.subscribe(Arc::new(sink));
    registry.start_monitoring();

    next_weight(&mut rx, "SCALE_03").await;
    let state = registry.connection_states().get("SCALE_03").copied();
    assert!(matches!(
        state,
        Some(ConnectionState::Connected | ConnectionState::AwaitingResponse)
    ));
    registry.stop_monitoring();
}

/// 记录所有回调的订阅者
#[derive(Default)]
struct RecordingSink {
    weights: Mutex<Vec<u32>>,
    errors: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl WeightEventSink for RecordingSink {
    async fn weight_received(&self, reading: &WeightReading) {
        self.weights.lock().expect("lock").push(reading.weight_kg);
    }

    async fn error(&self, scale_id: &str, _error: &ProtocolError) {
        self.errors.lock().expect("lock").push(scale_id.to_string());
    }
}

#[tokio::test]
async fn every_sink_receives_events() {
    let sim = simulator("SCALE_01").await;
    let registry = registry();
    registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", sim.port()));
    let recording = Arc::new(RecordingSink::default());
    let (sink, mut rx) = ChannelSink::channel();
    registry.subscribe(recording.clone());
    registry.subscribe(Arc::new(sink));
    registry.start_monitoring();

    let reading = next_weight(&mut rx, "SCALE_01").await;
    registry.stop_monitoring();

    // 分发按订阅顺序执行，ChannelSink 收到时 RecordingSink 已处理同一事件
    let weights = recording.weights.lock().expect("lock").clone();
    assert!(weights.contains(&reading.weight_kg));
    assert!(recording.errors.lock().expect("lock").is_empty());
}
