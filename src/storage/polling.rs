use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

use super::client::{Fetched, KvClient};
use super::core::{Batch, Data, KeyValues, Storage, StorageError, StorageState};
use super::options::PollOptions;
use crate::log::{LogLevel, Logger, MetadataValue};

/// 基于定时轮询的存储器
///
/// 每次 `get` 启动一个独立的轮询任务：立即拉取一次，之后每个间隔拉取一次，
/// 每次拉取的结果作为一个批次写入有界通道。通道写满时轮询任务等待消费方，
/// 拉取速度因此受消费速度限制。
///
/// `stop` 只负责发出停止信号；收到信号的轮询任务释放连接、标记 Stopped，
/// 最后关闭通道。消费方读到通道关闭即可确认清理完成。
///
/// 没有轮询任务持有停止信号的订阅时，由 `stop` 自己释放连接。轮询任务和
/// `get` 退出时先取消订阅再检查停止标记，因此两边至少有一方会看到对方，
/// 连接不会漏掉释放；重复释放由 [`Shared::release`] 吸收。
pub struct PollingStorage<C: KvClient> {
    shared: Arc<Shared<C>>,
    options: PollOptions,
    stop_tx: watch::Sender<bool>,
}

/// 轮询任务与存储器句柄共享的状态
struct Shared<C> {
    name: String,
    client: Mutex<Option<C>>,
    state: AtomicU8,
    stop_requested: AtomicBool,
    logger: Arc<Logger>,
}

/// 一次投递之后轮询任务的去向
enum Flow {
    Continue,
    Stop,
    /// 消费方已丢弃接收端
    Closed,
}

impl<C: KvClient> PollingStorage<C> {
    /// 用已连接的客户端创建存储器，不做连通性检查
    pub fn new(
        name: impl Into<String>,
        client: C,
        options: PollOptions,
        logger: Arc<Logger>,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                client: Mutex::new(Some(client)),
                state: AtomicU8::new(StorageState::Created as u8),
                stop_requested: AtomicBool::new(false),
                logger,
            }),
            options,
            stop_tx,
        }
    }

    /// ping 通过后创建存储器，供各驱动的 `open` 使用
    pub async fn open(
        name: impl Into<String>,
        mut client: C,
        options: PollOptions,
        logger: Arc<Logger>,
    ) -> Result<Self, StorageError> {
        if let Err(err) = client.ping().await {
            let _ = client.close().await;
            return Err(match err {
                StorageError::ConnectionFailed(msg) => StorageError::ConnectionFailed(msg),
                other => StorageError::ConnectionFailed(other.to_string()),
            });
        }

        let storage = Self::new(name, client, options, logger);
        storage
            .shared
            .log(
                LogLevel::Info,
                format!("{} storage opened", storage.shared.name),
                vec![
                    ("interval_secs", options.interval.as_secs().into()),
                    ("buff_size", options.buff_size.into()),
                ],
            )
            .await;

        Ok(storage)
    }

    /// 当前生命周期状态
    pub fn state(&self) -> StorageState {
        self.shared.state()
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    async fn poll(
        shared: Arc<Shared<C>>,
        keys: Vec<String>,
        interval: Duration,
        tx: mpsc::Sender<Batch>,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        // 第一次 tick 在一个完整间隔之后，立即拉取的那一次不占用 tick
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        shared
            .log(
                LogLevel::Debug,
                format!("{} storage polling started", shared.name),
                vec![("keys", keys.len().into())],
            )
            .await;

        let batch = shared.fetch_batch(&keys).await;
        let mut flow = deliver(&tx, batch, &mut stop_rx).await;

        while let Flow::Continue = flow {
            let ticked = tokio::select! {
                biased;
                _ = stop_signal(&mut stop_rx) => false,
                _ = ticker.tick() => true,
            };

            flow = if ticked {
                let batch = shared.fetch_batch(&keys).await;
                deliver(&tx, batch, &mut stop_rx).await
            } else {
                Flow::Stop
            };
        }

        // 先取消订阅再检查停止标记：stop 要么看到订阅数为 0 自己释放，
        // 要么在这之前已经置位，由这里释放
        drop(stop_rx);
        match flow {
            Flow::Closed if !shared.stop_requested.load(Ordering::SeqCst) => {
                shared
                    .log(
                        LogLevel::Debug,
                        format!("{} storage receiver dropped, poll task exits", shared.name),
                        Vec::new(),
                    )
                    .await;
            }
            _ => shared.release().await,
        }

        // 释放连接之后才关闭通道
        drop(tx);
    }
}

impl<C: KvClient> Shared<C> {
    fn state(&self) -> StorageState {
        StorageState::from(self.state.load(Ordering::SeqCst))
    }

    /// 日志失败不影响存储器
    async fn log(&self, level: LogLevel, message: String, metadata: Vec<(&str, MetadataValue)>) {
        let _ = self.logger.logm(level, message, metadata).await;
    }

    /// 拉取一个批次：整批失败时记录错误并返回空批次，缺失的 key 直接跳过
    async fn fetch_batch(&self, keys: &[String]) -> Batch {
        if keys.is_empty() {
            return Vec::new();
        }

        let result = {
            let mut client = self.client.lock().await;
            match client.as_mut() {
                Some(client) => client.mget(keys).await,
                // 连接已被释放，停止信号马上会被观察到
                None => return Vec::new(),
            }
        };

        let values = match result {
            Ok(values) if values.len() == keys.len() => values,
            Ok(values) => {
                self.report_fetch_error(
                    keys,
                    &StorageError::FetchFailed(format!(
                        "expected {} values, got {}",
                        keys.len(),
                        values.len()
                    )),
                )
                .await;
                return Vec::new();
            }
            Err(err) => {
                self.report_fetch_error(keys, &err).await;
                return Vec::new();
            }
        };

        keys.iter()
            .zip(values)
            .filter_map(|(key, fetched)| match fetched {
                Fetched::Value(value) => Some(Data::new(key.clone(), value)),
                Fetched::Absent => None,
                Fetched::Invalid(message) => Some(Data::with_error(
                    key.clone(),
                    StorageError::InvalidValue {
                        key: key.clone(),
                        message,
                    },
                )),
            })
            .collect()
    }

    async fn report_fetch_error(&self, keys: &[String], err: &StorageError) {
        self.log(
            LogLevel::Error,
            format!("{} storage failed to get data", self.name),
            vec![
                ("keys", keys.len().into()),
                ("error", err.to_string().into()),
            ],
        )
        .await;
    }

    /// 关闭连接并标记 Stopped，连接只会被关闭一次
    async fn release(&self) {
        let client = self.client.lock().await.take();
        self.state.store(StorageState::Stopped as u8, Ordering::SeqCst);

        if let Some(mut client) = client {
            if let Err(err) = client.close().await {
                self.log(
                    LogLevel::Error,
                    format!("{} storage failed to close connection", self.name),
                    vec![("error", err.to_string().into())],
                )
                .await;
            }
            self.log(LogLevel::Info, format!("{} storage stopped", self.name), Vec::new())
                .await;
        }
    }
}

/// 写入一个批次；通道满时同时等待停止信号，停止后不再写入
async fn deliver(
    tx: &mpsc::Sender<Batch>,
    batch: Batch,
    stop_rx: &mut watch::Receiver<bool>,
) -> Flow {
    tokio::select! {
        biased;
        _ = stop_signal(stop_rx) => Flow::Stop,
        sent = tx.send(batch) => match sent {
            Ok(()) => Flow::Continue,
            Err(_) => Flow::Closed,
        },
    }
}

/// 等待停止信号；存储器句柄被丢弃也视为停止
async fn stop_signal(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stopped| *stopped).await;
}

#[async_trait]
impl<C: KvClient> Storage for PollingStorage<C> {
    fn get(&self, keys: Vec<String>) -> Result<mpsc::Receiver<Batch>, StorageError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StorageError::Runtime(e.to_string()))?;

        // 先订阅再检查，保证 stop 要么被这里看到，要么被轮询任务看到
        let stop_rx = self.stop_tx.subscribe();
        if self.shared.stop_requested.load(Ordering::SeqCst) {
            // 并发的 stop 可能因为这个订阅而没有释放连接，取消订阅后由这里补上
            drop(stop_rx);
            if self.shared.state() != StorageState::Stopped {
                let shared = self.shared.clone();
                runtime.spawn(async move { shared.release().await });
            }
            return Err(StorageError::Stopped);
        }

        let (tx, rx) = mpsc::channel(self.options.buff_size);
        let _ = self.shared.state.compare_exchange(
            StorageState::Created as u8,
            StorageState::Polling as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        runtime.spawn(Self::poll(
            self.shared.clone(),
            keys,
            self.options.interval,
            tx,
            stop_rx,
        ));

        Ok(rx)
    }

    async fn stop(&self) -> Result<(), StorageError> {
        if self.shared.stop_requested.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.stop_tx.send_replace(true);

        // 没有存活的轮询任务（从未 get，或接收端都已丢弃）时由这里释放连接
        if self.stop_tx.receiver_count() == 0 {
            self.shared.release().await;
        }

        Ok(())
    }

    async fn success(&self, template: &str, kvs: &[KeyValues]) {
        self.shared
            .log(
                LogLevel::Info,
                format!("template: {} rendering success", template),
                vec![
                    ("storage", self.shared.name.clone().into()),
                    ("kvs", kvs.len().into()),
                ],
            )
            .await;
    }

    async fn error(
        &self,
        template: &str,
        kvs: &[KeyValues],
        err: &(dyn std::error::Error + Send + Sync),
    ) {
        self.shared
            .log(
                LogLevel::Error,
                format!("template: {} rendering failure, error: {}", template, err),
                vec![
                    ("storage", self.shared.name.clone().into()),
                    ("kvs", kvs.len().into()),
                ],
            )
            .await;
    }
}
