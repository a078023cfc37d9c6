//! 存储接口

use crate::error::StoreError;
use crate::models::ScaleRecord;
use std::collections::BTreeMap;

/// 秤配置存储
#[async_trait::async_trait]
pub trait ScaleStore: Send + Sync {
    /// 全部配置（按名称排序）
    async fn list(&self) -> Result<BTreeMap<String, ScaleRecord>, StoreError>;

    async fn get(&self, name: &str) -> Result<Option<ScaleRecord>, StoreError>;

    /// 新增或整体覆盖
    async fn upsert(&self, name: &str, record: ScaleRecord) -> Result<ScaleRecord, StoreError>;

    /// 删除；不存在时返回 `Ok(false)`
    async fn remove(&self, name: &str) -> Result<bool, StoreError>;
}
