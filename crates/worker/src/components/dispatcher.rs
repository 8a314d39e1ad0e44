use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::future::Future;
use std::sync::Arc;

use checker_core::{
    Adjunct, CheckerError, DiagnosticEvent, Job, JobKind, OperationContext, OperationError,
    OperationResult, Operations, ResultCode, ResultRecord, ShutdownSignal,
};
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::panic_trace::PanicTrace;
use super::reporter::Reporter;
use super::summary::summary_line;
use super::timing::{JobTimer, JobTimings};
use crate::metrics;

/// 单个任务的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// 结果记录已写入结果队列
    Reported(ResultRecord),
    /// 任务无法解码或操作未知，不产生结果记录
    Dropped,
}

/// 需要终止Worker循环的错误，其余错误都在任务内处理
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("任务处理因关闭信号而取消")]
    Cancelled,

    #[error("结果上报失败: {0}")]
    Transport(#[from] CheckerError),
}

/// 操作调用经过故障隔离后的结果
enum CallOutcome<T> {
    Completed(T),
    Faulted(String),
}

/// 故障隔离的任务分发器
///
/// 每个操作调用在独立的tokio任务中执行，错误和panic统一转为
/// `INTERNAL_ERROR`，只有取消信号会向上传播。
pub struct JobDispatcher {
    operations: Arc<dyn Operations>,
    reporter: Reporter,
    shutdown: ShutdownSignal,
}

impl JobDispatcher {
    pub fn new(operations: Arc<dyn Operations>, reporter: Reporter, shutdown: ShutdownSignal) -> Self {
        Self {
            operations,
            reporter,
            shutdown,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// 处理一条原始任务负载
    pub async fn handle_payload(&self, payload: &[u8]) -> Result<DispatchOutcome, DispatchError> {
        let timer = JobTimer::start();
        match Job::decode(payload) {
            Ok(job) => self.handle_job(job, timer).await,
            Err(e) => {
                warn!("Malformed job dropped: {}", e);
                metrics::record_job_dropped(metrics::DROP_MALFORMED);
                Ok(DispatchOutcome::Dropped)
            }
        }
    }

    /// 处理已解码的任务
    pub async fn handle_job(&self, job: Job, timer: JobTimer) -> Result<DispatchOutcome, DispatchError> {
        let span = info_span!(
            "job",
            job_id = %Uuid::new_v4(),
            operation = job.kind.as_str()
        );
        self.dispatch(job, timer).instrument(span).await
    }

    async fn dispatch(&self, job: Job, timer: JobTimer) -> Result<DispatchOutcome, DispatchError> {
        let (record, faulted) = match &job.kind {
            JobKind::Deposit => {
                let outcome = self
                    .isolate(&job, |ops, ctx, job| async move {
                        ops.deposit(
                            &ctx,
                            &job.endpoint,
                            &job.flag,
                            job.adjunct.as_bytes(),
                            &job.metadata,
                        )
                        .await
                    })
                    .await?;

                match outcome {
                    CallOutcome::Completed((status, adjunct)) => {
                        check_contract(status);
                        let record = ResultRecord::Deposit {
                            status,
                            flag: job.flag.clone(),
                            adjunct: Adjunct::new(adjunct),
                        };
                        (record, None)
                    }
                    CallOutcome::Faulted(message) => {
                        let record = ResultRecord::Deposit {
                            status: ResultCode::InternalError,
                            flag: job.flag.clone(),
                            adjunct: job.adjunct.clone(),
                        };
                        (record, Some(message))
                    }
                }
            }
            JobKind::Retrieve { request_id } => {
                let outcome = self
                    .isolate(&job, |ops, ctx, job| async move {
                        ops.retrieve(
                            &ctx,
                            &job.endpoint,
                            &job.flag,
                            job.adjunct.as_bytes(),
                            &job.metadata,
                        )
                        .await
                    })
                    .await?;

                let (status, faulted) = match outcome {
                    CallOutcome::Completed(status) => {
                        check_contract(status);
                        (status, None)
                    }
                    CallOutcome::Faulted(message) => (ResultCode::InternalError, Some(message)),
                };
                let record = ResultRecord::Retrieve {
                    request_id: request_id.clone(),
                    status,
                };
                (record, faulted)
            }
            JobKind::Unknown(operation) => {
                warn!("Unknown job! operation '{}' dropped", operation);
                metrics::record_job_dropped(metrics::DROP_UNKNOWN_OPERATION);
                return Ok(DispatchOutcome::Dropped);
            }
        };

        let timings = timer.finish(job.metadata.timestamp.as_deref());

        if let Some(message) = faulted {
            metrics::record_job_fault(job.kind.as_str());
            self.reporter
                .notify_diagnostic(DiagnosticEvent::from_fault(&job, record.status(), message));
        }

        self.report(&job, record, &timings).await
    }

    async fn report(
        &self,
        job: &Job,
        record: ResultRecord,
        timings: &JobTimings,
    ) -> Result<DispatchOutcome, DispatchError> {
        info!("{}", summary_line(job, &record, timings));
        metrics::record_job_reported(
            record.operation(),
            record.status().name(),
            timings.delivery_seconds,
            timings.processing_seconds,
        );

        self.reporter.publish(&record).await?;
        Ok(DispatchOutcome::Reported(record))
    }

    /// 在故障边界内执行一次操作调用
    async fn isolate<T, F, Fut>(&self, job: &Job, call: F) -> Result<CallOutcome<T>, DispatchError>
    where
        F: FnOnce(Arc<dyn Operations>, OperationContext, Job) -> Fut,
        Fut: Future<Output = OperationResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let ctx = OperationContext::new(self.shutdown.clone());
        let call = call(Arc::clone(&self.operations), ctx, job.clone());
        let trace = PanicTrace::new();

        match tokio::spawn(trace.scope(call.in_current_span())).await {
            Ok(Ok(value)) => Ok(CallOutcome::Completed(value)),
            Ok(Err(OperationError::Cancelled)) => {
                info!("Operation cancelled by shutdown signal");
                Err(DispatchError::Cancelled)
            }
            Ok(Err(OperationError::Failed(e))) => {
                if self.shutdown.is_shutdown() {
                    info!("Operation failed during shutdown: {}", e);
                    return Err(DispatchError::Cancelled);
                }
                log_fault(&e);
                Ok(CallOutcome::Faulted(e.to_string()))
            }
            Err(join_error) if join_error.is_panic() => {
                let message = panic_message(join_error.into_panic());
                error!("Operation panicked: {}", message);
                if let Some(backtrace) = trace.take() {
                    log_backtrace(&backtrace);
                }
                if self.shutdown.is_shutdown() {
                    return Err(DispatchError::Cancelled);
                }
                Ok(CallOutcome::Faulted(message))
            }
            Err(join_error) => {
                info!("Operation task aborted: {}", join_error);
                Err(DispatchError::Cancelled)
            }
        }
    }
}

/// 操作逻辑不应自行返回 `INTERNAL_ERROR`
fn check_contract(status: ResultCode) {
    if status == ResultCode::InternalError {
        warn!("Operation returned INTERNAL_ERROR itself, which is reserved for harness faults");
    }
}

fn log_fault(e: &anyhow::Error) {
    error!("{}", e);
    for cause in e.chain().skip(1) {
        error!("caused by: {}", cause);
    }
    // 未开启RUST_BACKTRACE时错误不携带调用栈，改为记录故障边界处的调用栈
    let backtrace = e.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        log_backtrace(&backtrace.to_string());
    } else {
        log_backtrace(&Backtrace::force_capture().to_string());
    }
}

fn log_backtrace(backtrace: &str) {
    error!("stack backtrace:");
    for line in backtrace.lines() {
        error!("{}", line);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

