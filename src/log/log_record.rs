use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::level::LogLevel;

/// 元数据值，任意 JSON 兼容的数据
///
/// `serde_json::Value` 已为字符串、整数、浮点、布尔实现 `From`，
/// 调用方可以直接写 `("keys", 3.into())`
pub type MetadataValue = serde_json::Value;

/// 日志记录
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// 日志级别
    pub level: LogLevel,
    /// 日志消息
    pub message: String,
    /// 源文件路径
    pub file: Option<String>,
    /// 行号
    pub line: Option<u32>,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 自定义元数据（保持插入顺序）
    pub metadata: Vec<(String, MetadataValue)>,
}

impl LogRecord {
    /// 创建新的日志记录
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
            line: None,
            timestamp: Utc::now(),
            metadata: Vec::new(),
        }
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// 设置位置信息（文件和行号）
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// RFC 3339 时间戳，毫秒精度
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Serialize for LogRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("timestamp", &self.timestamp_rfc3339())?;
        map.serialize_entry("level", &self.level.to_string())?;
        map.serialize_entry("message", &self.message)?;
        if let (Some(file), Some(line)) = (&self.file, self.line) {
            map.serialize_entry("file", file)?;
            map.serialize_entry("line", &line)?;
        }
        if !self.metadata.is_empty() {
            let metadata: serde_json::Map<String, MetadataValue> =
                self.metadata.iter().cloned().collect();
            map.serialize_entry("metadata", &metadata)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = LogRecord::new(LogLevel::Error, "fetch failed")
            .with_location("polling.rs", 42)
            .with_metadata("driver", "redis")
            .with_metadata("keys", 3);

        assert_eq!(record.message, "fetch failed");
        assert_eq!(record.file.as_deref(), Some("polling.rs"));
        assert_eq!(record.line, Some(42));
        assert_eq!(record.metadata[0].0, "driver");
        assert_eq!(record.metadata[0].1, serde_json::json!("redis"));
        assert_eq!(record.metadata[1].1, serde_json::json!(3));
    }

    #[test]
    fn test_record_serialize_skips_empty_fields() {
        let record = LogRecord::new(LogLevel::Info, "hello");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "hello");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(value.get("file").is_none());
        assert!(value.get("metadata").is_none());
    }
}
