//! Redis列表任务队列
//!
//! RPUSH发布，LPOP按固定间隔轮询消费，每个队列即一个Redis列表键。

pub mod config;

pub use config::RedisQueueConfig;

use std::time::Duration;

use async_trait::async_trait;
use checker_core::{CheckerError, CheckerResult, JobQueue};
use redis::aio::ConnectionManager;
use redis::Client;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

pub struct RedisJobQueue {
    connection: ConnectionManager,
    config: RedisQueueConfig,
}

impl RedisJobQueue {
    /// 连接Redis，失败时按配置重试
    pub async fn new(config: RedisQueueConfig) -> CheckerResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            CheckerError::MessageQueue(format!("Failed to create Redis client: {e}"))
        })?;

        let attempts = config.max_retry_attempts.max(1);
        let mut last_error = None;
        for attempt in 0..attempts {
            match ConnectionManager::new(client.clone()).await {
                Ok(connection) => {
                    let queue = Self {
                        connection,
                        config: config.clone(),
                    };
                    queue.ping().await?;
                    info!("Connected to Redis at {}", queue.config.redacted_url());
                    return Ok(queue);
                }
                Err(e) => {
                    if attempt + 1 < attempts {
                        warn!(
                            "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}s...",
                            attempt + 1,
                            attempts,
                            e,
                            config.retry_delay_seconds
                        );
                        sleep(Duration::from_secs(config.retry_delay_seconds)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(CheckerError::MessageQueue(format!(
            "Failed to connect to Redis after {attempts} attempts. Last error: {}",
            last_error.map_or("Unknown".to_string(), |e| e.to_string())
        )))
    }

    async fn execute<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> CheckerResult<T> {
        let mut connection = self.connection.clone();
        cmd.query_async::<T>(&mut connection)
            .await
            .map_err(|e| CheckerError::MessageQueue(format!("Redis command failed: {e}")))
    }

    pub async fn ping(&self) -> CheckerResult<()> {
        let response: String = self.execute(&redis::cmd("PING")).await?;
        if response == "PONG" {
            Ok(())
        } else {
            Err(CheckerError::MessageQueue(format!(
                "Unexpected PING response: {response}"
            )))
        }
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn publish(&self, queue: &str, payload: &[u8]) -> CheckerResult<()> {
        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(queue).arg(payload);
        let length: i64 = self.execute(&cmd).await?;
        debug!("Published to '{}', list length now {}", queue, length);
        Ok(())
    }

    async fn receive(&self, queue: &str, timeout: Duration) -> CheckerResult<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        let mut cmd = redis::cmd("LPOP");
        cmd.arg(queue);

        loop {
            let payload: Option<Vec<u8>> = self.execute(&cmd).await?;
            if let Some(payload) = payload {
                debug!("Received {} bytes from '{}'", payload.len(), queue);
                return Ok(Some(payload));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            sleep(self.config.poll_interval().min(deadline - now)).await;
        }
    }

    async fn create_queue(&self, queue: &str) -> CheckerResult<()> {
        // 列表在第一次RPUSH时自动创建
        debug!("Using Redis list '{}'", queue);
        Ok(())
    }

    async fn queue_size(&self, queue: &str) -> CheckerResult<u64> {
        let mut cmd = redis::cmd("LLEN");
        cmd.arg(queue);
        self.execute(&cmd).await
    }

    async fn purge_queue(&self, queue: &str) -> CheckerResult<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(queue);
        let deleted: i64 = self.execute(&cmd).await?;
        info!("Purged Redis list '{}' (deleted keys: {})", queue, deleted);
        Ok(())
    }

    async fn close(&self) -> CheckerResult<()> {
        // ConnectionManager在最后一个克隆释放时断开
        info!("Disconnected from Redis at {}", self.config.redacted_url());
        Ok(())
    }
}
