use async_trait::async_trait;

use crate::{models::DiagnosticEvent, CheckerResult};

/// 外部错误追踪服务
#[async_trait]
pub trait Diagnostics: Send + Sync {
    /// 发送一条诊断事件
    async fn capture(&self, event: &DiagnosticEvent) -> CheckerResult<()>;

    /// 是否实际上报
    fn is_enabled(&self) -> bool {
        true
    }
}

/// 未配置诊断服务时的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

#[async_trait]
impl Diagnostics for NoopDiagnostics {
    async fn capture(&self, _event: &DiagnosticEvent) -> CheckerResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
