//! 秤配置内存存储
//!
//! 仅用于测试。

use crate::error::StoreError;
use crate::models::ScaleRecord;
use crate::traits::ScaleStore;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 使用 RwLock + BTreeMap 的内存存储
#[derive(Default)]
pub struct InMemoryScaleStore {
    records: RwLock<BTreeMap<String, ScaleRecord>>,
}

impl InMemoryScaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ScaleStore for InMemoryScaleStore {
    async fn list(&self) -> Result<BTreeMap<String, ScaleRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .map(|map| map.clone())
            .unwrap_or_default())
    }

    async fn get(&self, name: &str) -> Result<Option<ScaleRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .ok()
            .and_then(|map| map.get(name).cloned()))
    }

    async fn upsert(&self, name: &str, record: ScaleRecord) -> Result<ScaleRecord, StoreError> {
        if let Ok(mut map) = self.records.write() {
            map.insert(name.to_string(), record.clone());
        }
        Ok(record)
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .records
            .write()
            .map(|mut map| map.remove(name).is_some())
            .unwrap_or(false))
    }
}
