use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::core::{Driver, Storage, StorageError};
use crate::cfg::TypeOptions;
use crate::log::Logger;

/// 驱动注册表：驱动名称 -> 驱动
///
/// 由组装程序在启动时创建一次，再以引用的方式传给需要创建存储器的地方。
/// 各驱动模块通过显式的注册函数（见 [`register_drivers`](super::register_drivers)）
/// 把自己注册进来，注册顺序无关。
///
/// # 示例
/// ```ignore
/// use appconf::storage::{register_drivers, Registry};
///
/// let registry = Registry::new();
/// register_drivers(&registry);
///
/// let storage = registry
///     .new_storage("redis", logger, serde_json::json!({
///         "hostname": "127.0.0.1",
///         "port": 6379,
///         "interval": 30
///     }))
///     .await?;
/// let mut rx = storage.get(vec!["app/port".to_string()])?;
/// ```
#[derive(Default)]
pub struct Registry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册驱动
    ///
    /// # Panics
    ///
    /// 名称已被注册时 panic。重复注册是启动阶段的编程错误，不是运行时可恢复的情况。
    pub fn register(&self, name: &str, driver: impl Driver + 'static) {
        if let Err(err) = self.try_register(name, driver) {
            panic!("{}", err);
        }
    }

    /// 注册驱动，名称已存在时返回 [`StorageError::DuplicateDriver`]
    pub fn try_register(&self, name: &str, driver: impl Driver + 'static) -> Result<(), StorageError> {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);

        if drivers.contains_key(name) {
            return Err(StorageError::DuplicateDriver(name.to_string()));
        }

        drivers.insert(name.to_string(), Arc::new(driver));
        Ok(())
    }

    /// 已注册的驱动名称，顺序不保证
    pub fn list(&self) -> Vec<String> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// 根据名称找到驱动并创建存储器
    ///
    /// 查找只在读锁内完成，建立连接（可能较慢）时不持有锁
    pub async fn new_storage(
        &self,
        name: &str,
        logger: Arc<Logger>,
        options: JsonValue,
    ) -> Result<Box<dyn Storage>, StorageError> {
        let driver = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::DriverNotFound(name.to_string()))?;

        driver.open(logger, options).await
    }

    /// 使用 `{"type": 驱动名称, "options": {...}}` 形式的配置创建存储器
    pub async fn new_from_type_options(
        &self,
        logger: Arc<Logger>,
        type_options: &TypeOptions,
    ) -> Result<Box<dyn Storage>, StorageError> {
        self.new_storage(&type_options.type_name, logger, type_options.options.clone())
            .await
    }
}
