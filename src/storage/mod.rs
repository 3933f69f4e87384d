//! storage 模块 - 可插拔的轮询式 key/value 数据源
//!
//! - [`Registry`]：驱动名称到驱动的映射，启动时注册，运行时按名称创建存储器
//! - [`Driver`]：解析配置、建立连接，返回 [`Storage`]
//! - [`Storage`]：`get` 返回数据通道，`stop` 停止轮询并释放连接
//! - [`PollingStorage`]：所有内置驱动共用的轮询实现，后端只需实现 [`KvClient`]
//!
//! 内置驱动：`redis`（MGET）和 `memory`（DashMap）。

pub mod client;
pub mod core;
pub mod memory_driver;
pub mod options;
pub mod polling;
pub mod redis_driver;
pub mod register;
pub mod registry;

pub use client::{Fetched, KvClient};
pub use core::{
    decode_options, Batch, Data, Driver, KeyValues, Storage, StorageError, StorageState, Value,
};
pub use memory_driver::{MemoryClient, MemoryDriver, MemoryStorageConfig, MEMORY_DRIVER};
pub use options::{PollOptions, DEFAULT_BUFF_SIZE, DEFAULT_INTERVAL};
pub use polling::PollingStorage;
pub use redis_driver::{RedisClient, RedisDriver, RedisStorageConfig, REDIS_DRIVER};
pub use register::{register_drivers, register_memory_driver, register_redis_driver};
pub use registry::Registry;
