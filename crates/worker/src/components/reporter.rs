use std::sync::Arc;

use checker_core::{CheckerResult, DiagnosticEvent, Diagnostics, JobQueue, ResultRecord};
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

/// 结果上报
///
/// 把结果记录写入结果队列，并可选地把故障事件发往诊断服务。
#[derive(Clone)]
pub struct Reporter {
    queue: Arc<dyn JobQueue>,
    report_queue: String,
    diagnostics: Arc<dyn Diagnostics>,
    server_name: Option<String>,
}

impl Reporter {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        report_queue: impl Into<String>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            queue,
            report_queue: report_queue.into(),
            diagnostics,
            server_name: None,
        }
    }

    /// 诊断事件中携带的主机名
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    pub fn report_queue(&self) -> &str {
        &self.report_queue
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.is_enabled()
    }

    /// 编码结果记录并写入结果队列，传输错误原样返回
    pub async fn publish(&self, record: &ResultRecord) -> CheckerResult<()> {
        let payload = record.encode()?;
        self.queue.publish(&self.report_queue, &payload).await?;
        debug!(
            "Published {} result to '{}'",
            record.operation(),
            self.report_queue
        );
        Ok(())
    }

    /// 发送诊断事件
    ///
    /// 在后台任务中执行，调用方不等待结果；失败或panic只记录告警。
    /// 返回的句柄仅供需要等待发送完成的调用方使用。
    pub fn notify_diagnostic(&self, event: DiagnosticEvent) -> Option<JoinHandle<()>> {
        if !self.diagnostics.is_enabled() {
            return None;
        }

        let event = match &self.server_name {
            Some(name) => event.with_server_name(name.clone()),
            None => event,
        };
        let diagnostics = Arc::clone(&self.diagnostics);

        let handle = tokio::spawn(
            async move {
                let capture = tokio::spawn(async move { diagnostics.capture(&event).await });
                match capture.await {
                    Ok(Ok(())) => debug!("Diagnostic event sent"),
                    Ok(Err(e)) => warn!("Failed to send diagnostic event: {}", e),
                    Err(e) => warn!("Diagnostic sink task failed: {}", e),
                }
            }
            .in_current_span(),
        );
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_core::{Adjunct, CheckerError, Job, JobKind, JobMetadata, NoopDiagnostics, ResultCode};
    use checker_infrastructure::InMemoryJobQueue;
    use mockall::mock;
    use std::time::Duration;

    mock! {
        Sink {}

        #[async_trait::async_trait]
        impl Diagnostics for Sink {
            async fn capture(&self, event: &DiagnosticEvent) -> CheckerResult<()>;
            fn is_enabled(&self) -> bool;
        }
    }

    fn fault_event() -> DiagnosticEvent {
        let job = Job {
            kind: JobKind::Deposit,
            endpoint: "10.0.0.5:7777".to_string(),
            flag: "FLAG_abc".to_string(),
            adjunct: Adjunct::default(),
            metadata: JobMetadata::default(),
        };
        DiagnosticEvent::from_fault(&job, ResultCode::InternalError, "boom")
    }

    #[tokio::test]
    async fn test_publish_writes_to_report_queue() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let reporter = Reporter::new(queue.clone(), "reports", Arc::new(NoopDiagnostics));

        let record = ResultRecord::Retrieve {
            request_id: "r-1".to_string(),
            status: ResultCode::Up,
        };
        reporter.publish(&record).await.unwrap();

        let payload = queue
            .receive("reports", Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ResultRecord::decode(&payload).unwrap(), record);
    }

    #[tokio::test]
    async fn test_notify_attaches_server_name() {
        let mut sink = MockSink::new();
        sink.expect_is_enabled().return_const(true);
        sink.expect_capture()
            .withf(|event| event.server_name.as_deref() == Some("checker-1"))
            .times(1)
            .returning(|_| Ok(()));

        let reporter = Reporter::new(Arc::new(InMemoryJobQueue::new()), "reports", Arc::new(sink))
            .with_server_name("checker-1");
        reporter.notify_diagnostic(fault_event()).unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_notify_failure_is_contained() {
        let mut sink = MockSink::new();
        sink.expect_is_enabled().return_const(true);
        sink.expect_capture()
            .times(1)
            .returning(|_| Err(CheckerError::Diagnostics("sink down".to_string())));

        let reporter = Reporter::new(Arc::new(InMemoryJobQueue::new()), "reports", Arc::new(sink));
        reporter.notify_diagnostic(fault_event()).unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_notify_skipped_when_disabled() {
        let mut sink = MockSink::new();
        sink.expect_is_enabled().return_const(false);
        sink.expect_capture().never();

        let reporter = Reporter::new(Arc::new(InMemoryJobQueue::new()), "reports", Arc::new(sink));
        assert!(!reporter.diagnostics_enabled());
        assert!(reporter.notify_diagnostic(fault_event()).is_none());
    }
}
