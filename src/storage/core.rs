use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::log::Logger;

/// 存储器交付给消费方的值（不透明标量，后端通常返回字符串）
pub type Value = serde_json::Value;

/// 模板渲染时使用的一组 key/value
pub type KeyValues = serde_json::Map<String, Value>;

/// 一次轮询得到的数据批次，按请求的 key 顺序排列，缺失的 key 直接跳过
pub type Batch = Vec<Data>;

/// 存储相关错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("storage: register called twice for driver {0}")]
    DuplicateDriver(String),

    #[error("storage: not found driver {0}")]
    DriverNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Invalid value for key {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    #[error("storage already stopped")]
    Stopped,
}

/// 存储器与消费方之间交流的数据
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub key: String,
    pub value: Value,
    /// 单个 key 的错误（例如值无法解码），整批失败不会出现在这里
    pub err: Option<StorageError>,
}

impl Data {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            err: None,
        }
    }

    pub fn with_error(key: impl Into<String>, err: StorageError) -> Self {
        Self {
            key: key.into(),
            value: Value::Null,
            err: Some(err),
        }
    }
}

/// 存储器生命周期：Created -> Polling -> Stopped，每个状态最多进入一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageState {
    Created = 0,
    Polling = 1,
    Stopped = 2,
}

impl From<u8> for StorageState {
    fn from(value: u8) -> Self {
        match value {
            0 => StorageState::Created,
            1 => StorageState::Polling,
            _ => StorageState::Stopped,
        }
    }
}

/// 配置存储器
#[async_trait]
pub trait Storage: Send + Sync {
    /// 开始轮询指定 keys，立即返回数据通道
    ///
    /// 第一批数据在第一个间隔到来之前送达；通道关闭表示存储器已停止。
    /// 必须在 tokio 运行时内调用。
    fn get(&self, keys: Vec<String>) -> Result<mpsc::Receiver<Batch>, StorageError>;

    /// 停止轮询并释放连接，重复调用直接返回成功
    async fn stop(&self) -> Result<(), StorageError>;

    /// 当 key 所在模板渲染成功时通知存储器
    async fn success(&self, template: &str, kvs: &[KeyValues]);

    /// 当 key 所在模板渲染失败时通知存储器
    async fn error(
        &self,
        template: &str,
        kvs: &[KeyValues],
        err: &(dyn std::error::Error + Send + Sync),
    );
}

/// 自定义 Storage 需要实现此接口并注册到 [`Registry`](super::Registry)
#[async_trait]
pub trait Driver: Send + Sync {
    /// 解析配置、建立连接并检查连通性，成功后返回处于 Created 状态的存储器
    async fn open(
        &self,
        logger: Arc<Logger>,
        options: JsonValue,
    ) -> Result<Box<dyn Storage>, StorageError>;
}

/// 将驱动配置解析为具体的配置结构体
pub fn decode_options<T: serde::de::DeserializeOwned>(options: JsonValue) -> Result<T, StorageError> {
    // null 视为空配置，全部使用默认值
    let options = match options {
        JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(options).map_err(|e| StorageError::InvalidConfig(e.to_string()))
}
