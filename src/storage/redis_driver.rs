use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::client::{Fetched, KvClient};
use super::core::{decode_options, Driver, Storage, StorageError, Value};
use super::options::PollOptions;
use super::polling::PollingStorage;
use crate::log::Logger;

/// redis 驱动的注册名称
pub const REDIS_DRIVER: &str = "redis";

/// Redis 存储配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct RedisStorageConfig {
    // ===== 连接配置 =====
    #[default = "localhost"]
    #[serde(alias = "host")]
    pub hostname: String,

    #[default = 6379]
    pub port: u16,

    // ===== 认证配置 =====
    /// Redis 6.0+ ACL 用户名
    pub username: Option<String>,

    pub password: Option<String>,

    /// 数据库编号
    #[default = 0]
    pub db: i64,

    // ===== 轮询配置 =====
    /// 轮询间隔（秒），小于 1 时使用 300
    #[default = 0]
    pub interval: i64,

    /// 数据通道容量，不大于 0 时使用 1024
    #[default = 0]
    pub buff_size: i64,

    // ===== 超时配置 =====
    /// 建立连接和 PING 的超时（秒），0 表示不限制
    #[default = 5]
    pub connection_timeout: u64,

    /// 每次 MGET 的超时（秒），0 表示不限制
    #[default = 3]
    pub command_timeout: u64,
}

impl RedisStorageConfig {
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.hostname.trim().is_empty() {
            return Err(StorageError::InvalidConfig("hostname must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(StorageError::InvalidConfig("port must not be 0".to_string()));
        }
        if self.db < 0 {
            return Err(StorageError::InvalidConfig(format!("invalid db {}", self.db)));
        }
        Ok(())
    }

    /// 构建连接 URL：`redis://[user][:password@]host:port/db`
    pub fn url(&self) -> String {
        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!(
                "{}:{}@",
                urlencoding::encode(username),
                urlencoding::encode(password)
            ),
            (None, Some(password)) => format!(":{}@", urlencoding::encode(password)),
            (Some(username), None) => format!("{}@", urlencoding::encode(username)),
            (None, None) => String::new(),
        };

        // IPv6 地址需要方括号
        let host = if self.hostname.contains(':') && !self.hostname.starts_with('[') {
            format!("[{}]", self.hostname)
        } else {
            self.hostname.clone()
        };

        format!("redis://{}{}:{}/{}", auth, host, self.port, self.db)
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::resolve(self.interval, self.buff_size)
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// 在可选的超时内执行 redis 命令
async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> Result<T, String>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("timed out after {}s", limit.as_secs())),
        },
        None => fut.await.map_err(|e| e.to_string()),
    }
}

/// 基于多路复用连接的 redis 客户端
pub struct RedisClient {
    con: Option<MultiplexedConnection>,
    connection_timeout: Option<Duration>,
    command_timeout: Option<Duration>,
}

impl RedisClient {
    pub async fn connect(config: &RedisStorageConfig) -> Result<Self, StorageError> {
        let client = redis::Client::open(config.url())
            .map_err(|e| StorageError::InvalidConfig(format!("Invalid connection URL: {}", e)))?;

        let connection_timeout = seconds(config.connection_timeout);
        let con = bounded(connection_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|e| {
                StorageError::ConnectionFailed(format!(
                    "{}:{}: {}",
                    config.hostname, config.port, e
                ))
            })?;

        Ok(Self {
            con: Some(con),
            connection_timeout,
            command_timeout: seconds(config.command_timeout),
        })
    }

    fn connection(&mut self) -> Result<&mut MultiplexedConnection, StorageError> {
        self.con
            .as_mut()
            .ok_or_else(|| StorageError::FetchFailed("connection closed".to_string()))
    }
}

/// 非 UTF-8 的值无法作为字符串交付，标记为单个 key 的错误
fn convert(raw: Option<Vec<u8>>) -> Fetched {
    match raw {
        None => Fetched::Absent,
        Some(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Fetched::Value(Value::String(s)),
            Err(e) => Fetched::Invalid(format!("value is not valid UTF-8: {}", e)),
        },
    }
}

#[async_trait]
impl KvClient for RedisClient {
    async fn ping(&mut self) -> Result<(), StorageError> {
        let limit = self.connection_timeout;
        let con = self.connection()?;

        bounded(limit, redis::cmd("PING").query_async::<String>(con))
            .await
            .map(|_| ())
            .map_err(|e| StorageError::ConnectionFailed(format!("PING failed: {}", e)))
    }

    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Fetched>, StorageError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.command_timeout;
        let con = self.connection()?;

        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key.as_str());
        }

        let values = bounded(limit, cmd.query_async::<Vec<Option<Vec<u8>>>>(con))
            .await
            .map_err(|e| StorageError::FetchFailed(format!("MGET failed: {}", e)))?;

        Ok(values.into_iter().map(convert).collect())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        // 多路复用连接在最后一个句柄被丢弃时断开
        self.con.take();
        Ok(())
    }
}

/// redis 驱动：MGET 批量读取 string 类型的 key
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisDriver;

#[async_trait]
impl Driver for RedisDriver {
    async fn open(
        &self,
        logger: Arc<Logger>,
        options: JsonValue,
    ) -> Result<Box<dyn Storage>, StorageError> {
        let config: RedisStorageConfig = decode_options(options)?;
        config.validate()?;

        let client = RedisClient::connect(&config).await?;
        let storage =
            PollingStorage::open(REDIS_DRIVER, client, config.poll_options(), logger).await?;

        Ok(Box::new(storage))
    }
}
