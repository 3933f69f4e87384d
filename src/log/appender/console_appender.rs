use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::io::{self, Write};

use crate::log::appender::LogAppender;

/// 输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, SmartDefault)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Stdout,
    Stderr,
}

/// ConsoleAppender 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ConsoleAppenderConfig {
    /// 输出到 stdout 还是 stderr
    pub target: Target,

    /// 每条日志后是否立即 flush
    #[default = true]
    pub auto_flush: bool,
}

/// 终端输出器
pub struct ConsoleAppender {
    config: ConsoleAppenderConfig,
}

impl ConsoleAppender {
    pub fn new(config: ConsoleAppenderConfig) -> Self {
        Self { config }
    }

    fn write_line(out: &mut impl Write, message: &str, flush: bool) -> io::Result<()> {
        writeln!(out, "{}", message)?;
        if flush {
            out.flush()?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LogAppender for ConsoleAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        match self.config.target {
            Target::Stdout => {
                Self::write_line(&mut io::stdout().lock(), formatted_message, self.config.auto_flush)?
            }
            Target::Stderr => {
                Self::write_line(&mut io::stderr().lock(), formatted_message, self.config.auto_flush)?
            }
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        match self.config.target {
            Target::Stdout => io::stdout().flush()?,
            Target::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }
}
