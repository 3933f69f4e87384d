use anyhow::{anyhow, Result};

use super::{ConsoleAppender, ConsoleAppenderConfig, FileAppender, FileAppenderConfig};
use crate::cfg::TypeOptions;

/// 日志输出器 trait
///
/// 负责将格式化后的日志输出到目标介质
#[async_trait::async_trait]
pub trait LogAppender: Send + Sync {
    /// 输出日志
    async fn append(&self, formatted_message: &str) -> Result<()>;

    /// 刷新缓冲区（默认实现为空操作）
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// 从 TypeOptions 创建 Appender
///
/// 支持的类型：`ConsoleAppender`、`FileAppender`
pub fn create_appender(options: &TypeOptions) -> Result<Box<dyn LogAppender>> {
    match options.type_name.as_str() {
        "ConsoleAppender" => {
            let config: ConsoleAppenderConfig = options.decode()?;
            Ok(Box::new(ConsoleAppender::new(config)))
        }
        "FileAppender" => {
            let config: FileAppenderConfig = options.decode()?;
            Ok(Box::new(FileAppender::new(config)?))
        }
        other => Err(anyhow!("appender type '{}' not supported", other)),
    }
}
