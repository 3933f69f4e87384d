use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use tokio::sync::RwLock;

use crate::cfg::TypeOptions;
use crate::log::appender::{create_appender, ConsoleAppender, ConsoleAppenderConfig, LogAppender};
use crate::log::formatter::{create_formatter, LogFormatter, TextFormatter, TextFormatterConfig};
use crate::log::level::LogLevel;
use crate::log::log_record::{LogRecord, MetadataValue};

/// Logger 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// 日志级别
    #[default = "info"]
    pub level: String,

    /// Formatter 配置
    #[default(TypeOptions::new("TextFormatter", serde_json::json!({})))]
    pub formatter: TypeOptions,

    /// Appender 配置
    #[default(TypeOptions::new("ConsoleAppender", serde_json::json!({})))]
    pub appender: TypeOptions,
}

/// 核心日志器
///
/// 负责日志的级别控制、格式化和输出
pub struct Logger {
    level: RwLock<LogLevel>,
    formatter: Box<dyn LogFormatter>,
    appender: Box<dyn LogAppender>,
}

impl Logger {
    /// 从配置创建 Logger，无法识别的级别按 info 处理
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let level = config.level.parse::<LogLevel>().unwrap_or(LogLevel::Info);
        let formatter = create_formatter(&config.formatter)?;
        let appender = create_appender(&config.appender)?;

        Ok(Self::from_parts(level, formatter, appender))
    }

    /// 直接使用组件构造
    pub fn from_parts(
        level: LogLevel,
        formatter: Box<dyn LogFormatter>,
        appender: Box<dyn LogAppender>,
    ) -> Self {
        Self {
            level: RwLock::new(level),
            formatter,
            appender,
        }
    }

    /// 设置日志级别
    pub async fn set_level(&self, level: LogLevel) {
        *self.level.write().await = level;
    }

    /// 获取当前日志级别
    pub async fn get_level(&self) -> LogLevel {
        *self.level.read().await
    }

    /// 记录日志
    pub async fn log(&self, record: LogRecord) -> Result<()> {
        if record.level < *self.level.read().await {
            return Ok(());
        }

        let formatted = self.formatter.format(&record)?;
        self.appender.append(&formatted).await
    }

    /// 记录带 metadata 的日志（通用方法）
    ///
    /// # 示例
    ///
    /// ```ignore
    /// logger.logm(
    ///     LogLevel::Error,
    ///     "storage failed to get data",
    ///     vec![("driver", "redis".into()), ("keys", 3.into())],
    /// ).await?;
    /// ```
    pub async fn logm(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        let mut record = LogRecord::new(level, message);
        for (key, value) in metadata {
            record.metadata.push((key.into(), value));
        }
        self.log(record).await
    }

    pub async fn trace(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Trace, message)).await
    }

    pub async fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Debug, message)).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Info, message)).await
    }

    pub async fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Warn, message)).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Error, message)).await
    }

    pub async fn debugm(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        self.logm(LogLevel::Debug, message, metadata).await
    }

    pub async fn infom(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        self.logm(LogLevel::Info, message, metadata).await
    }

    pub async fn warnm(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        self.logm(LogLevel::Warn, message, metadata).await
    }

    pub async fn errorm(
        &self,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        self.logm(LogLevel::Error, message, metadata).await
    }
}

/// 默认 logger：info 级别，文本格式输出到 stdout
impl Default for Logger {
    fn default() -> Self {
        Self::from_parts(
            LogLevel::Info,
            Box::new(TextFormatter::new(TextFormatterConfig::default())),
            Box::new(ConsoleAppender::new(ConsoleAppenderConfig::default())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_logger(level: &str, path: &std::path::Path) -> Logger {
        let config: LoggerConfig = json5::from_str(&format!(
            r#"{{
                level: "{}",
                formatter: {{ type: "TextFormatter", options: {{}} }},
                appender: {{ type: "FileAppender", options: {{ file_path: "{}" }} }}
            }}"#,
            level,
            path.display()
        ))
        .expect("Failed to parse LoggerConfig");

        Logger::new(config).unwrap()
    }

    #[test]
    fn test_logger_config_default() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.formatter.type_name, "TextFormatter");
        assert_eq!(config.appender.type_name, "ConsoleAppender");
    }

    #[tokio::test]
    async fn test_logger_new_with_invalid_level_falls_back_to_info() -> Result<()> {
        let logger = Logger::new(LoggerConfig {
            level: "verbose".to_string(),
            ..Default::default()
        })?;
        assert_eq!(logger.get_level().await, LogLevel::Info);
        Ok(())
    }

    #[tokio::test]
    async fn test_logger_set_level() {
        let logger = Logger::default();
        logger.set_level(LogLevel::Debug).await;
        assert_eq!(logger.get_level().await, LogLevel::Debug);
    }

    #[tokio::test]
    async fn test_logger_level_filtering() -> Result<()> {
        let temp_file = tempfile::NamedTempFile::new()?;
        let logger = file_logger("info", temp_file.path());

        logger.debug("debug msg").await?;
        logger.info("info msg").await?;
        logger.error("error msg").await?;

        let contents = tokio::fs::read_to_string(temp_file.path()).await?;
        assert!(!contents.contains("debug msg"));
        assert!(contents.contains("INFO  info msg"));
        assert!(contents.contains("ERROR error msg"));

        Ok(())
    }

    #[tokio::test]
    async fn test_logger_metadata_methods() -> Result<()> {
        let temp_file = tempfile::NamedTempFile::new()?;
        let logger = file_logger("debug", temp_file.path());

        logger
            .errorm(
                "storage failed to get data",
                vec![("driver", "redis".into()), ("keys", 2.into())],
            )
            .await?;
        logger
            .infom("template rendered", vec![("template", "app.conf".into())])
            .await?;
        logger.warnm("slow fetch", vec![("elapsed_ms", 1500.into())]).await?;
        logger.debugm("tick", vec![("cycle", 3.into())]).await?;

        let contents = tokio::fs::read_to_string(temp_file.path()).await?;
        assert!(contents.contains("storage failed to get data | driver=redis keys=2"));
        assert!(contents.contains("template rendered | template=app.conf"));
        assert!(contents.contains("slow fetch | elapsed_ms=1500"));
        assert!(contents.contains("tick | cycle=3"));

        Ok(())
    }
}
