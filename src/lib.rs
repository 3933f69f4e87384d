//! appconf - 配置渲染工具的数据源层
//!
//! 通过名称选择存储驱动，打开连接后按固定间隔拉取一组 key 的当前值，
//! 以批次的形式交给消费方（通常是模板渲染器）。
//!
//! ## 模块
//!
//! - **storage**: 驱动注册表、轮询存储器以及内置的 redis / memory 驱动
//! - **cfg**: `TypeOptions` 配置信封（JSON5 / YAML / TOML）
//! - **log**: 日志模块（支持多种格式和输出方式）
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use appconf::storage::{register_drivers, Registry};
//! use appconf::Logger;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Registry::new();
//!     register_drivers(&registry);
//!
//!     let logger = Arc::new(Logger::default());
//!     let storage = registry
//!         .new_storage("redis", logger, serde_json::json!({"hostname": "127.0.0.1", "interval": 30}))
//!         .await?;
//!
//!     let mut rx = storage.get(vec!["app/port".to_string()])?;
//!     if let Some(batch) = rx.recv().await {
//!         for data in batch {
//!             println!("{} = {}", data.key, data.value);
//!         }
//!     }
//!
//!     storage.stop().await?;
//!     while rx.recv().await.is_some() {}
//!     Ok(())
//! }
//! ```

pub mod cfg;
pub mod log;
pub mod storage;

// 重新导出主要的公共 API
pub use cfg::TypeOptions;

pub use log::{LogAppender, LogFormatter, LogLevel, LogRecord, Logger, LoggerConfig};

pub use storage::{
    register_drivers, Batch, Data, Driver, PollOptions, PollingStorage, Registry, Storage,
    StorageError, StorageState,
};
