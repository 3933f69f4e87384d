use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fmt::Write;

use crate::log::formatter::LogFormatter;
use crate::log::level::LogLevel;
use crate::log::log_record::{LogRecord, MetadataValue};

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否启用颜色输出
    #[default = false]
    pub colored: bool,
}

/// 文本格式化器
///
/// 格式：`[时间戳] 级别 [文件:行号] 消息 | k=v k=v`
pub struct TextFormatter {
    config: TextFormatterConfig,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self { config }
    }

    fn dimmed(&self, buffer: &mut String, text: &str) {
        if self.config.colored {
            buffer.push_str("\x1b[2m");
            buffer.push_str(text);
            buffer.push_str("\x1b[0m");
        } else {
            buffer.push_str(text);
        }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut result = String::with_capacity(64 + record.message.len());

        result.push('[');
        self.dimmed(&mut result, &record.timestamp_rfc3339());
        result.push_str("] ");

        if self.config.colored {
            write!(result, "{} ", colored_level(record.level))?;
        } else {
            write!(result, "{:<5} ", record.level)?;
        }

        if let (Some(file), Some(line)) = (&record.file, record.line) {
            result.push('[');
            self.dimmed(&mut result, &format!("{}:{}", file, line));
            result.push_str("] ");
        }

        result.push_str(&record.message);

        if !record.metadata.is_empty() {
            result.push_str(" |");
            for (key, value) in &record.metadata {
                result.push(' ');
                if self.config.colored {
                    write!(result, "\x1b[36m{}\x1b[0m", key)?;
                } else {
                    result.push_str(key);
                }
                result.push('=');
                write_value(&mut result, value)?;
            }
        }

        Ok(result)
    }
}

/// 字符串不加引号，其余按 JSON 输出
fn write_value(buffer: &mut String, value: &MetadataValue) -> std::fmt::Result {
    match value {
        MetadataValue::String(s) => {
            buffer.push_str(s);
            Ok(())
        }
        other => write!(buffer, "{}", other),
    }
}

fn colored_level(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "\u{1b}[31mERROR\u{1b}[0m",
        LogLevel::Warn => "\u{1b}[33mWARN \u{1b}[0m",
        LogLevel::Info => "\u{1b}[32mINFO \u{1b}[0m",
        LogLevel::Debug => "\u{1b}[36mDEBUG\u{1b}[0m",
        LogLevel::Trace => "\u{1b}[37;2mTRACE\u{1b}[0m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_formatter_format() {
        let formatter = TextFormatter::new(TextFormatterConfig::default());
        let record = LogRecord::new(LogLevel::Info, "test message");

        let formatted = formatter.format(&record).unwrap();

        assert!(formatted.starts_with('['));
        assert!(formatted.contains("Z] INFO  test message"));
    }

    #[test]
    fn test_text_formatter_with_location() {
        let formatter = TextFormatter::new(TextFormatterConfig::default());
        let record = LogRecord::new(LogLevel::Error, "error message").with_location("file.rs", 42);

        let formatted = formatter.format(&record).unwrap();
        assert!(formatted.contains("ERROR [file.rs:42] error message"));
    }

    #[test]
    fn test_text_formatter_with_metadata() {
        let formatter = TextFormatter::new(TextFormatterConfig::default());
        let record = LogRecord::new(LogLevel::Info, "template rendered")
            .with_metadata("template", "nginx.conf")
            .with_metadata("kvs", 2)
            .with_metadata("ok", true);

        let formatted = formatter.format(&record).unwrap();
        assert!(formatted.ends_with("template rendered | template=nginx.conf kvs=2 ok=true"));
    }

    #[test]
    fn test_text_formatter_colored() {
        let formatter = TextFormatter::new(TextFormatterConfig { colored: true });
        let record = LogRecord::new(LogLevel::Error, "error message");

        let formatted = formatter.format(&record).unwrap();
        assert!(formatted.contains("\u{1b}[31mERROR"));
        assert!(formatted.contains("error message"));
    }
}
