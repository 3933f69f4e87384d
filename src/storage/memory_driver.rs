use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

use super::client::{Fetched, KvClient};
use super::core::{decode_options, Driver, Storage, StorageError, Value};
use super::options::PollOptions;
use super::polling::PollingStorage;
use crate::log::Logger;

/// memory 驱动的注册名称
pub const MEMORY_DRIVER: &str = "memory";

/// 内存存储配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MemoryStorageConfig {
    pub interval: i64,
    pub buff_size: i64,

    /// 打开时写入的初始数据
    pub data: HashMap<String, Value>,
}

/// 基于 DashMap 的内存驱动
///
/// 同一个驱动打开的存储器共享一份数据，克隆出的驱动也指向同一份数据，
/// 注册之后仍可以通过保留的克隆修改数据，下一次轮询即可看到。
///
/// # 示例
/// ```ignore
/// let driver = MemoryDriver::new();
/// registry.register(MEMORY_DRIVER, driver.clone());
///
/// driver.set("app/port", "8080");
/// ```
#[derive(Clone, Default)]
pub struct MemoryDriver {
    data: Arc<DashMap<String, Value>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            data: Arc::new(data.into_iter().collect()),
        }
    }

    pub fn data(&self) -> Arc<DashMap<String, Value>> {
        self.data.clone()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, value)| value)
    }
}

/// 读取共享 DashMap 的客户端
pub struct MemoryClient {
    data: Arc<DashMap<String, Value>>,
    closed: bool,
}

impl MemoryClient {
    pub fn new(data: Arc<DashMap<String, Value>>) -> Self {
        Self {
            data,
            closed: false,
        }
    }
}

#[async_trait]
impl KvClient for MemoryClient {
    async fn ping(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Fetched>, StorageError> {
        if self.closed {
            return Err(StorageError::FetchFailed("connection closed".to_string()));
        }

        Ok(keys
            .iter()
            .map(|key| match self.data.get(key) {
                Some(value) => Fetched::Value(value.clone()),
                None => Fetched::Absent,
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn open(
        &self,
        logger: Arc<Logger>,
        options: JsonValue,
    ) -> Result<Box<dyn Storage>, StorageError> {
        let config: MemoryStorageConfig = decode_options(options)?;

        for (key, value) in config.data {
            self.data.insert(key, value);
        }

        let storage = PollingStorage::open(
            MEMORY_DRIVER,
            MemoryClient::new(self.data.clone()),
            PollOptions::resolve(config.interval, config.buff_size),
            logger,
        )
        .await?;

        Ok(Box::new(storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn logger() -> Arc<Logger> {
        Arc::new(Logger::default())
    }

    #[test]
    fn test_driver_data() {
        let driver = MemoryDriver::with_data([("a".to_string(), Value::from("1"))]);
        let shared = driver.clone();

        shared.set("b", "2");
        assert_eq!(driver.data().len(), 2);
        assert_eq!(driver.remove("a"), Some(Value::from("1")));
        assert_eq!(driver.remove("a"), None);
    }

    #[tokio::test]
    async fn test_client_mget() {
        let driver = MemoryDriver::with_data([("a".to_string(), Value::from("1"))]);
        let mut client = MemoryClient::new(driver.data());

        let fetched = client
            .mget(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(fetched, vec![Fetched::Value(Value::from("1")), Fetched::Absent]);

        client.close().await.unwrap();
        assert!(client.mget(&["a".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_open_seeds_data() {
        let driver = MemoryDriver::new();
        let storage = driver
            .open(
                logger(),
                serde_json::json!({"data": {"app/port": "8080"}, "buff_size": 4}),
            )
            .await
            .unwrap();

        let mut rx = storage
            .get(vec!["app/port".to_string(), "app/host".to_string()])
            .unwrap();
        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].key, "app/port");
        assert_eq!(batch[0].value, Value::from("8080"));

        storage.stop().await.unwrap();
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_open_invalid_options() {
        let result = MemoryDriver::new()
            .open(logger(), serde_json::json!({"data": "not a map"}))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_visible_on_next_tick() {
        let driver = MemoryDriver::with_data([("a".to_string(), Value::from("1"))]);
        let storage = driver
            .open(logger(), serde_json::json!({"interval": 1, "buff_size": 2}))
            .await
            .unwrap();

        let mut rx = storage.get(vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(rx.recv().await.unwrap(), vec![crate::storage::Data::new("a", "1")]);

        driver.set("a", "2");
        driver.set("b", "3");
        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(
            rx.recv().await.unwrap(),
            vec![
                crate::storage::Data::new("a", "2"),
                crate::storage::Data::new("b", "3"),
            ]
        );

        storage.stop().await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
