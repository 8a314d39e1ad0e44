use async_trait::async_trait;
use thiserror::Error;

use crate::models::{JobMetadata, ResultCode};
use crate::shutdown::ShutdownSignal;

/// 操作逻辑返回的错误
#[derive(Debug, Error)]
pub enum OperationError {
    /// 操作观察到关闭信号并主动放弃，不会被故障隔离吞掉
    #[error("操作因关闭信号而取消")]
    Cancelled,

    /// 其他任何失败，由Worker隔离并记为 `INTERNAL_ERROR`
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl OperationError {
    pub fn failed(error: impl Into<anyhow::Error>) -> Self {
        OperationError::Failed(error.into())
    }
}

pub type OperationResult<T> = std::result::Result<T, OperationError>;

/// 传给操作逻辑的执行上下文
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub shutdown: ShutdownSignal,
}

impl OperationContext {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self { shutdown }
    }

    /// 长时间运行的操作可以在检查点调用，收到关闭信号时返回 `Cancelled`
    pub fn ensure_not_cancelled(&self) -> OperationResult<()> {
        if self.shutdown.is_shutdown() {
            Err(OperationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// 由集成方提供的push/pull操作
///
/// 实现可以执行网络IO等任意工作，失败以 `Err` 返回（panic同样会被隔离）。
/// 正常路径不应返回 `ResultCode::InternalError`。
#[async_trait]
pub trait Operations: Send + Sync + 'static {
    /// 向 `endpoint` 存入flag，返回状态和更新后的adjunct
    async fn deposit(
        &self,
        ctx: &OperationContext,
        endpoint: &str,
        flag: &str,
        adjunct: &[u8],
        metadata: &JobMetadata,
    ) -> OperationResult<(ResultCode, Vec<u8>)>;

    /// 检查 `endpoint` 上的flag是否仍然存在且有效
    async fn retrieve(
        &self,
        ctx: &OperationContext,
        endpoint: &str,
        flag: &str,
        adjunct: &[u8],
        metadata: &JobMetadata,
    ) -> OperationResult<ResultCode>;
}

/// 未提供操作逻辑时使用，所有调用都失败
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedOperations;

#[async_trait]
impl Operations for UnimplementedOperations {
    async fn deposit(
        &self,
        _ctx: &OperationContext,
        _endpoint: &str,
        _flag: &str,
        _adjunct: &[u8],
        _metadata: &JobMetadata,
    ) -> OperationResult<(ResultCode, Vec<u8>)> {
        Err(anyhow::anyhow!("Push flag logic not implemented!").into())
    }

    async fn retrieve(
        &self,
        _ctx: &OperationContext,
        _endpoint: &str,
        _flag: &str,
        _adjunct: &[u8],
        _metadata: &JobMetadata,
    ) -> OperationResult<ResultCode> {
        Err(anyhow::anyhow!("Pull flag logic not implemented!").into())
    }
}
