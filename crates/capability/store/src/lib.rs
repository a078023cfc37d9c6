//! # 秤配置存储
//!
//! 以秤名称为键保存 `{ ip, port, description, updatedAt }`。
//!
//! - [`JsonFileScaleStore`]：落盘到一个 JSON 文件，启动时加载，每次修改原子写回
//! - [`InMemoryScaleStore`]：仅内存，用于测试
//!
//! ```rust,ignore
//! let store = JsonFileScaleStore::open("scale-config.json").await?;
//! store.upsert("SCALE_01", ScaleRecord::new("192.168.1.10", 3002, "")).await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod json_file;
pub mod models;
pub mod traits;

pub use error::StoreError;
pub use in_memory::InMemoryScaleStore;
pub use json_file::JsonFileScaleStore;
pub use models::ScaleRecord;
pub use traits::ScaleStore;
