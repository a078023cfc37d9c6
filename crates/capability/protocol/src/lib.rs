//! # 秤协议能力模块
//!
//! 负责与单台秤终端的 TCP 通信：
//! - **报文解析**：从终端原始字节中提取重量（`parse_weight`）
//! - **探测帧**：256 字节全零帧，请求终端返回当前重量
//! - **连接监督**：连接 → 探测 → 等待响应 → 断线固定延迟重连
//!
//! ## 架构设计
//!
//! ```text
//! MonitorRegistry (scale-monitor)
//!       │ 每台秤一个
//!       ▼
//! ConnectionSupervisor ──TCP──▶ 秤终端
//!       │ parse_weight
//!       ▼
//! MonitorEvent (mpsc) ──▶ 注册表分发 ──▶ WeightEventSink
//! ```
//!
//! ## 线路协议
//!
//! - 客户端 → 终端：256 字节全零探测帧
//! - 终端 → 客户端：`ST,GS,+,0004567kg\r\n`（= 4567 kg）

mod error;
mod parser;
mod supervisor;
mod types;

pub use error::ProtocolError;
pub use parser::parse_weight;
pub use supervisor::{ConnectionSupervisor, ConnectionTable};
pub use types::*;
