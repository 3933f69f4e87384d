use async_trait::async_trait;

use super::core::{StorageError, Value};

/// 批量读取时单个 key 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Value(Value),
    /// 后端不存在该 key
    Absent,
    /// 后端有值但无法转换，附带原因
    Invalid(String),
}

/// 后端 key/value 客户端
///
/// 轮询存储器只依赖这三个操作，具体协议由实现决定
#[async_trait]
pub trait KvClient: Send + 'static {
    /// 连通性检查
    async fn ping(&mut self) -> Result<(), StorageError>;

    /// 批量读取，结果与 keys 一一对应；整批失败返回错误
    async fn mget(&mut self, keys: &[String]) -> Result<Vec<Fetched>, StorageError>;

    /// 释放连接，轮询存储器保证最多调用一次
    async fn close(&mut self) -> Result<(), StorageError>;
}
