//! 存储层错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
