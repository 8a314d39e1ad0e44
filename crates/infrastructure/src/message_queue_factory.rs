use std::sync::Arc;

use checker_core::{
    CheckerConfig, CheckerResult, Diagnostics, JobQueue, MessageQueueType, NoopDiagnostics,
};
use tracing::{debug, info};

use crate::{HttpDiagnostics, InMemoryJobQueue, RedisJobQueue, RedisQueueConfig};

pub struct MessageQueueFactory;

impl MessageQueueFactory {
    /// 按配置创建任务队列连接
    pub async fn create(config: &CheckerConfig) -> CheckerResult<Arc<dyn JobQueue>> {
        debug!("Creating job queue with type: {:?}", config.queue_type);

        match config.queue_type {
            MessageQueueType::Redis => {
                let redis_config = RedisQueueConfig::from_checker_config(config);
                info!(
                    "Initializing Redis job queue at {}",
                    redis_config.redacted_url()
                );
                let queue = RedisJobQueue::new(redis_config).await?;
                Ok(Arc::new(queue))
            }
            MessageQueueType::Memory => {
                info!("Initializing in-memory job queue");
                Ok(Arc::new(InMemoryJobQueue::new()))
            }
        }
    }
}

/// 按配置创建诊断上报，未配置地址时返回不上报的实现
pub fn create_diagnostics(config: &CheckerConfig) -> CheckerResult<Arc<dyn Diagnostics>> {
    match &config.diagnostics_endpoint {
        Some(endpoint) => {
            info!("Diagnostics enabled, sending fault events to {}", endpoint);
            let diagnostics = HttpDiagnostics::new(endpoint, config.diagnostics_timeout())?;
            Ok(Arc::new(diagnostics))
        }
        None => {
            debug!("Diagnostics endpoint not configured, fault events stay local");
            Ok(Arc::new(NoopDiagnostics))
        }
    }
}
