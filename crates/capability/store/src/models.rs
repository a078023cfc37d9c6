//! 存储模型

use chrono::{DateTime, Utc};
use domain::ScaleConfig;
use serde::{Deserialize, Serialize};

/// 单台秤的持久化配置（键为秤名称，不在记录内）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRecord {
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub description: String,
    #[serde(with = "domain::time::iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl ScaleRecord {
    /// 以当前时间作为 `updated_at` 创建记录
    pub fn new(ip: impl Into<String>, port: u16, description: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            description: description.into(),
            updated_at: Utc::now(),
        }
    }

    /// 转换为监控使用的连接配置
    pub fn to_scale_config(&self, name: &str) -> ScaleConfig {
        ScaleConfig::new(name, self.ip.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_timestamp() {
        let record: ScaleRecord = serde_json::from_str(
            r#"{"ip":"10.0.0.5","port":3002,"description":"dock","updatedAt":"2024-05-01T08:30:00.123Z"}"#,
        )
        .expect("parse");
        assert_eq!(record.port, 3002);

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["updatedAt"], "2024-05-01T08:30:00.123Z");
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let record: ScaleRecord = serde_json::from_str(
            r#"{"ip":"10.0.0.5","port":3002,"updatedAt":"2024-05-01T08:30:00.000Z"}"#,
        )
        .expect("parse");
        assert_eq!(record.description, "");

        let config = record.to_scale_config("SCALE_01");
        assert_eq!(config.addr(), "10.0.0.5:3002");
    }
}
