use std::sync::Arc;

use anyhow::{Context, Result};
use checker_core::{CheckerConfig, Operations, ShutdownSignal};
use checker_infrastructure::{create_diagnostics, MessageQueueFactory};
use checker_worker::{WorkerService, WorkerServiceBuilder};
use tracing::info;

/// 主应用程序
pub struct Application {
    config: CheckerConfig,
    service: WorkerService,
}

impl Application {
    /// 连接任务队列并组装Worker
    pub async fn new(config: CheckerConfig, operations: Arc<dyn Operations>) -> Result<Self> {
        info!("初始化应用程序，队列类型: {:?}", config.queue_type);

        let queue = MessageQueueFactory::create(&config)
            .await
            .context("创建任务队列失败")?;
        let diagnostics = create_diagnostics(&config).context("创建诊断上报失败")?;

        let service = WorkerServiceBuilder::from_config(&config, queue, operations)
            .diagnostics(diagnostics)
            .build();

        Ok(Self { config, service })
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// 运行Worker直到关闭信号触发
    pub async fn run(&self, shutdown: ShutdownSignal) -> Result<()> {
        info!(
            "启动Worker，监听队列 '{}'",
            self.service.tube_listen()
        );
        self.service.run(shutdown).await.context("Worker运行失败")?;
        info!("Worker已停止");
        Ok(())
    }
}
