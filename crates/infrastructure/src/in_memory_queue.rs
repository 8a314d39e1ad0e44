use async_trait::async_trait;
use checker_core::{CheckerError, CheckerResult, JobQueue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// 内存任务队列实现
///
/// 使用 Tokio channels 实现，适用于嵌入式运行和测试场景。
#[derive(Debug, Clone)]
pub struct InMemoryJobQueue {
    /// 队列存储：队列名 -> 通道
    queues: Arc<RwLock<HashMap<String, QueueChannels>>>,
    config: InMemoryQueueConfig,
}

#[derive(Debug, Clone)]
struct QueueChannels {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    /// 使用 Arc 包装接收端，支持多个消费者
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
    /// 队列大小统计
    size: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct InMemoryQueueConfig {
    /// 队列最大容量（0表示无限制）
    pub max_queue_size: u64,
}

impl Default for InMemoryQueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10000,
        }
    }
}

impl InMemoryJobQueue {
    /// 创建新的内存任务队列实例
    pub fn new() -> Self {
        Self::with_config(InMemoryQueueConfig::default())
    }

    /// 使用指定配置创建内存任务队列实例
    pub fn with_config(config: InMemoryQueueConfig) -> Self {
        debug!("Creating in-memory job queue with config: {:?}", config);
        Self {
            queues: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// 获取或创建队列通道
    async fn get_or_create_queue(&self, queue_name: &str) -> QueueChannels {
        if let Some(channels) = self.queues.read().await.get(queue_name) {
            return channels.clone();
        }

        let mut queues = self.queues.write().await;
        queues
            .entry(queue_name.to_string())
            .or_insert_with(|| {
                let (sender, receiver) = mpsc::unbounded_channel();
                info!("Created queue '{}'", queue_name);
                QueueChannels {
                    sender,
                    receiver: Arc::new(Mutex::new(receiver)),
                    size: Arc::new(AtomicU64::new(0)),
                }
            })
            .clone()
    }

    async fn existing_queue(&self, queue_name: &str) -> CheckerResult<QueueChannels> {
        self.queues
            .read()
            .await
            .get(queue_name)
            .cloned()
            .ok_or_else(|| CheckerError::MessageQueue(format!("Queue '{queue_name}' not found")))
    }

    /// 非阻塞地取出队列中当前所有负载
    pub async fn drain(&self, queue: &str) -> CheckerResult<Vec<Vec<u8>>> {
        let channels = self.existing_queue(queue).await?;
        let mut payloads = Vec::new();
        {
            let mut rx = channels.receiver.lock().await;
            while let Ok(payload) = rx.try_recv() {
                payloads.push(payload);
            }
        }
        channels
            .size
            .fetch_sub(payloads.len() as u64, Ordering::Relaxed);
        Ok(payloads)
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn publish(&self, queue: &str, payload: &[u8]) -> CheckerResult<()> {
        let channels = self.get_or_create_queue(queue).await;

        if self.config.max_queue_size > 0
            && channels.size.load(Ordering::Relaxed) >= self.config.max_queue_size
        {
            warn!("Queue '{}' is full, rejecting payload", queue);
            return Err(CheckerError::MessageQueue(format!(
                "Queue '{queue}' reached max size {}",
                self.config.max_queue_size
            )));
        }

        channels.sender.send(payload.to_vec()).map_err(|e| {
            CheckerError::MessageQueue(format!("Failed to send payload to queue '{queue}': {e}"))
        })?;
        channels.size.fetch_add(1, Ordering::Relaxed);

        debug!("Published {} bytes to queue '{}'", payload.len(), queue);
        Ok(())
    }

    async fn receive(&self, queue: &str, timeout: Duration) -> CheckerResult<Option<Vec<u8>>> {
        let channels = self.get_or_create_queue(queue).await;
        let mut rx = channels.receiver.lock().await;

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(payload)) => {
                channels.size.fetch_sub(1, Ordering::Relaxed);
                debug!("Received {} bytes from queue '{}'", payload.len(), queue);
                Ok(Some(payload))
            }
            Ok(None) => Err(CheckerError::MessageQueue(format!(
                "Queue '{queue}' was closed"
            ))),
            Err(_) => Ok(None),
        }
    }

    async fn create_queue(&self, queue: &str) -> CheckerResult<()> {
        self.get_or_create_queue(queue).await;
        Ok(())
    }

    async fn queue_size(&self, queue: &str) -> CheckerResult<u64> {
        let channels = self.existing_queue(queue).await?;
        Ok(channels.size.load(Ordering::Relaxed))
    }

    async fn purge_queue(&self, queue: &str) -> CheckerResult<()> {
        let purged = self.drain(queue).await?;
        info!("Purged {} payloads from queue '{}'", purged.len(), queue);
        Ok(())
    }

    async fn close(&self) -> CheckerResult<()> {
        debug!("In-memory job queue closed");
        Ok(())
    }
}
