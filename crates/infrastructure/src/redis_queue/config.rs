use std::time::Duration;

use checker_core::CheckerConfig;
use serde::{Deserialize, Serialize};

/// Redis列表队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisQueueConfig {
    pub url: String,
    pub max_retry_attempts: u32,
    pub retry_delay_seconds: u64,
    /// 队列为空时两次LPOP之间的间隔
    pub poll_interval_ms: u64,
}

impl Default for RedisQueueConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            max_retry_attempts: 3,
            retry_delay_seconds: 1,
            poll_interval_ms: 200,
        }
    }
}

impl RedisQueueConfig {
    pub fn from_checker_config(config: &CheckerConfig) -> Self {
        Self {
            url: config.queue_uri.clone(),
            poll_interval_ms: config.poll_interval_ms,
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// 去掉密码后的地址，用于日志
    pub fn redacted_url(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
