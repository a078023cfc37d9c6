//! # 秤监控能力模块
//!
//! - [`MonitorRegistry`]：管理一组秤配置及其连接监督器，统一启动/停止
//! - [`WeightEventSink`]：称重/错误事件订阅接口
//! - [`request_weight`]：单次称重请求（临时注册表 + 超时 + 拆除）
//!
//! ```rust,ignore
//! let registry = MonitorRegistry::new();
//! registry.add_scale(ScaleConfig::new("SCALE_01", "127.0.0.1", 3002));
//! registry.subscribe(Arc::new(my_sink));
//! registry.start_monitoring();
//! // ...
//! registry.stop_monitoring();
//! ```

mod registry;
mod request;
mod sink;

pub use registry::MonitorRegistry;
pub use request::{RequestSettings, request_weight, request_weight_with};
pub use sink::{ChannelSink, WeightEventSink};
