use std::sync::Arc;
use std::time::Duration;

use checker_core::{
    CheckerConfig, CheckerResult, Diagnostics, JobQueue, NoopDiagnostics, Operations,
    ShutdownSignal,
};
use tracing::{debug, error, info, warn};

use crate::components::{DispatchError, JobDispatcher, Reporter};

/// Worker服务构建器
pub struct WorkerServiceBuilder {
    queue: Arc<dyn JobQueue>,
    operations: Arc<dyn Operations>,
    diagnostics: Arc<dyn Diagnostics>,
    tube_listen: String,
    tube_report: String,
    receive_timeout: Duration,
    server_name: String,
}

impl WorkerServiceBuilder {
    /// 创建新的构建器
    pub fn new(
        queue: Arc<dyn JobQueue>,
        operations: Arc<dyn Operations>,
        tube_listen: impl Into<String>,
        tube_report: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            operations,
            diagnostics: Arc::new(NoopDiagnostics),
            tube_listen: tube_listen.into(),
            tube_report: tube_report.into(),
            receive_timeout: Duration::from_millis(1000),
            server_name: hostname::get()
                .unwrap_or_else(|_| "unknown".into())
                .to_string_lossy()
                .to_string(),
        }
    }

    /// 使用配置中的队列名称和超时
    pub fn from_config(
        config: &CheckerConfig,
        queue: Arc<dyn JobQueue>,
        operations: Arc<dyn Operations>,
    ) -> Self {
        Self::new(queue, operations, &config.tube_listen, &config.tube_report)
            .receive_timeout(config.receive_timeout())
    }

    /// 设置诊断上报
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// 设置单次等待任务的超时
    pub fn receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    /// 设置主机名
    pub fn server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    /// 构建WorkerService
    pub fn build(self) -> WorkerService {
        let reporter = Reporter::new(Arc::clone(&self.queue), self.tube_report.clone(), self.diagnostics)
            .with_server_name(self.server_name);
        WorkerService {
            queue: self.queue,
            operations: self.operations,
            reporter,
            tube_listen: self.tube_listen,
            tube_report: self.tube_report,
            receive_timeout: self.receive_timeout,
        }
    }
}

/// Worker循环
///
/// 逐个接收任务并分发，直到关闭信号触发、操作被取消或传输失败。
pub struct WorkerService {
    queue: Arc<dyn JobQueue>,
    operations: Arc<dyn Operations>,
    reporter: Reporter,
    tube_listen: String,
    tube_report: String,
    receive_timeout: Duration,
}

impl WorkerService {
    /// 创建构建器
    pub fn builder(
        queue: Arc<dyn JobQueue>,
        operations: Arc<dyn Operations>,
        tube_listen: impl Into<String>,
        tube_report: impl Into<String>,
    ) -> WorkerServiceBuilder {
        WorkerServiceBuilder::new(queue, operations, tube_listen, tube_report)
    }

    pub fn tube_listen(&self) -> &str {
        &self.tube_listen
    }

    pub fn tube_report(&self) -> &str {
        &self.tube_report
    }

    /// 运行直到关闭；退出前总会关闭队列连接
    pub async fn run(&self, shutdown: ShutdownSignal) -> CheckerResult<()> {
        self.queue.create_queue(&self.tube_listen).await?;
        self.queue.create_queue(&self.tube_report).await?;
        info!(
            "Connected to job queue, listening on '{}', reporting to '{}'",
            self.tube_listen, self.tube_report
        );
        if self.reporter.diagnostics_enabled() {
            info!("Diagnostic sink enabled");
        }

        let dispatcher = JobDispatcher::new(
            Arc::clone(&self.operations),
            self.reporter.clone(),
            shutdown.clone(),
        );
        let result = self.process_jobs(&dispatcher, shutdown).await;

        if let Err(e) = self.queue.close().await {
            warn!("Failed to close job queue: {}", e);
        }
        info!("Disconnected from job queue");
        result
    }

    async fn process_jobs(
        &self,
        dispatcher: &JobDispatcher,
        mut shutdown: ShutdownSignal,
    ) -> CheckerResult<()> {
        loop {
            if shutdown.is_shutdown() {
                info!("Received shutdown signal");
                return Ok(());
            }

            let received = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Received shutdown signal");
                    return Ok(());
                }
                received = self.queue.receive(&self.tube_listen, self.receive_timeout) => received,
            };

            let payload = match received {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(e) => {
                    error!("Failed to receive job from '{}': {}", self.tube_listen, e);
                    return Err(e);
                }
            };
            debug!("Received job ({} bytes)", payload.len());

            match dispatcher.handle_payload(&payload).await {
                Ok(_) => {}
                Err(DispatchError::Cancelled) => {
                    info!("Received shutdown signal while processing job");
                    return Ok(());
                }
                Err(DispatchError::Transport(e)) => {
                    error!("Failed to report result to '{}': {}", self.tube_report, e);
                    return Err(e);
                }
            }
        }
    }
}
