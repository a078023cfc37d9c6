//! Handlers 模块

pub mod health;
pub mod metrics;
pub mod scales;
pub mod weight;

pub use health::*;
pub use metrics::*;
pub use scales::*;
pub use weight::*;
