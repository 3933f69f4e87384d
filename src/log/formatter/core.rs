use anyhow::{anyhow, Result};

use super::{JsonFormatter, JsonFormatterConfig, TextFormatter, TextFormatterConfig};
use crate::cfg::TypeOptions;
use crate::log::log_record::LogRecord;

/// 日志格式化器 trait
///
/// 负责将 LogRecord 格式化为字符串
pub trait LogFormatter: Send + Sync {
    /// 格式化日志记录
    fn format(&self, record: &LogRecord) -> Result<String>;
}

/// 从 TypeOptions 创建 Formatter
///
/// 支持的类型：`TextFormatter`、`JsonFormatter`
pub fn create_formatter(options: &TypeOptions) -> Result<Box<dyn LogFormatter>> {
    match options.type_name.as_str() {
        "TextFormatter" => {
            let config: TextFormatterConfig = options.decode()?;
            Ok(Box::new(TextFormatter::new(config)))
        }
        "JsonFormatter" => {
            let config: JsonFormatterConfig = options.decode()?;
            Ok(Box::new(JsonFormatter::new(config)))
        }
        other => Err(anyhow!("formatter type '{}' not supported", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::level::LogLevel;

    #[test]
    fn test_create_formatter() -> Result<()> {
        let record = LogRecord::new(LogLevel::Info, "hello");

        let text = create_formatter(&TypeOptions::from_json(
            r#"{type: "TextFormatter", options: {colored: false}}"#,
        )?)?;
        assert!(text.format(&record)?.contains("INFO  hello"));

        let json = create_formatter(&TypeOptions::from_json(r#"{type: "JsonFormatter"}"#)?)?;
        let value: serde_json::Value = serde_json::from_str(&json.format(&record)?)?;
        assert_eq!(value["message"], "hello");

        Ok(())
    }

    #[test]
    fn test_create_unknown_formatter() {
        let result = create_formatter(&TypeOptions::new("XmlFormatter", serde_json::json!({})));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("XmlFormatter"));
    }
}
