//! JSON 文件存储
//!
//! 文件内容为 `名称 → 记录` 的对象，两空格缩进。
//! 启动时加载：文件不存在则立即写入空对象；读取失败或不是合法 JSON 对象则记录错误并以空配置启动；
//! 单条记录不符合格式时只跳过该条，其余照常加载。
//! 每次修改先写同目录下的临时文件再 rename，写入失败时内存状态不变。

use crate::error::StoreError;
use crate::models::ScaleRecord;
use crate::traits::ScaleStore;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

type Records = BTreeMap<String, ScaleRecord>;

pub struct JsonFileScaleStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileScaleStore {
    /// 打开（必要时创建）配置文件
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(data) => match decode_records(&data) {
                Ok(records) => {
                    info!(
                        path = %path.display(),
                        scales = ?records.keys().collect::<Vec<_>>(),
                        "loaded scale configurations"
                    );
                    records
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "invalid scale config file, starting empty");
                    Records::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let records = Records::new();
                persist(&path, &records).await?;
                info!(path = %path.display(), "created empty scale config file");
                records
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to read scale config file, starting empty");
                Records::new()
            }
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ScaleStore for JsonFileScaleStore {
    async fn list(&self) -> Result<Records, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<ScaleRecord>, StoreError> {
        Ok(self.records.lock().await.get(name).cloned())
    }

    async fn upsert(&self, name: &str, record: ScaleRecord) -> Result<ScaleRecord, StoreError> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.insert(name.to_string(), record.clone());
        persist(&self.path, &next).await?;
        *records = next;
        info!(name = %name, "scale configuration saved");
        Ok(record)
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        if !records.contains_key(name) {
            return Ok(false);
        }
        let mut next = records.clone();
        next.remove(name);
        persist(&self.path, &next).await?;
        *records = next;
        info!(name = %name, "scale configuration deleted");
        Ok(true)
    }
}

/// 逐条解析配置文件，跳过无法识别的记录
fn decode_records(data: &str) -> Result<Records, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(data)?;
    let mut records = Records::new();
    for (name, value) in raw {
        match serde_json::from_value::<ScaleRecord>(value) {
            Ok(record) => {
                records.insert(name, record);
            }
            Err(err) => warn!(name = %name, error = %err, "skipping invalid scale configuration"),
        }
    }
    Ok(records)
}

/// 原子写回：临时文件 + rename
async fn persist(path: &Path, records: &Records) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    if let Err(err) = tokio::fs::write(&tmp, body).await {
        warn!(path = %tmp.display(), error = %err, "failed to write scale config");
        return Err(err.into());
    }
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        warn!(path = %path.display(), error = %err, "failed to replace scale config");
        return Err(err.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("scale-config.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
