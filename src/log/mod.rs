//! 日志模块
//!
//! 存储驱动的可观测性出口：轮询失败、连接释放、模板渲染结果都通过这里输出。
//!
//! # 特性
//!
//! - 日志级别：Trace, Debug, Info, Warn, Error
//! - 格式化器：TextFormatter、JsonFormatter
//! - 输出目标：ConsoleAppender、FileAppender
//! - 通过 `TypeOptions` 配置动态选择组件
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use appconf::log::{Logger, LoggerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config: LoggerConfig = json5::from_str(r#"
//!         {
//!             level: "info",
//!             formatter: { type: "JsonFormatter", options: {} },
//!             appender: { type: "ConsoleAppender", options: { target: "stderr" } }
//!         }
//!     "#)?;
//!
//!     let logger = Logger::new(config)?;
//!     logger.info("storage opened").await?;
//!     logger.errorm("fetch failed", vec![("driver", "redis".into())]).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod formatter;
pub mod level;
pub mod log_record;
pub mod logger;

pub use appender::{
    create_appender, ConsoleAppender, ConsoleAppenderConfig, FileAppender, FileAppenderConfig,
    LogAppender, Target,
};
pub use formatter::{
    create_formatter, JsonFormatter, JsonFormatterConfig, LogFormatter, TextFormatter,
    TextFormatterConfig,
};
pub use level::LogLevel;
pub use log_record::{LogRecord, MetadataValue};
pub use logger::{Logger, LoggerConfig};
