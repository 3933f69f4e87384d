use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::log::formatter::LogFormatter;
use crate::log::log_record::LogRecord;

/// JsonFormatter 配置
#[derive(Debug, Clone, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct JsonFormatterConfig {
    /// 是否美化输出（多行缩进）
    #[default = false]
    pub pretty: bool,
}

/// JSON 格式化器，每条记录一个 JSON 对象
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(config: JsonFormatterConfig) -> Self {
        Self {
            pretty: config.pretty,
        }
    }
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(record)?)
        } else {
            Ok(serde_json::to_string(record)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;

    #[test]
    fn test_json_formatter_format() {
        let formatter = JsonFormatter::new(JsonFormatterConfig::default());
        let record = LogRecord::new(LogLevel::Info, "test message");

        let formatted = formatter.format(&record).unwrap();
        assert!(!formatted.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "test message");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_json_formatter_with_metadata() {
        let formatter = JsonFormatter::new(JsonFormatterConfig { pretty: true });
        let record = LogRecord::new(LogLevel::Error, "redis storage failed to get data")
            .with_location("polling.rs", 7)
            .with_metadata("driver", "redis")
            .with_metadata("keys", 2);

        let formatted = formatter.format(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();

        assert_eq!(value["file"], "polling.rs");
        assert_eq!(value["line"], 7);
        assert_eq!(value["metadata"]["driver"], "redis");
        assert_eq!(value["metadata"]["keys"], 2);
    }
}
