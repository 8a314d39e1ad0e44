use std::sync::Arc;

use tokio::sync::watch;

/// 关闭信号的只读句柄
///
/// 信号一旦触发就保持触发状态，可以在任意时刻查询，也可以异步等待。
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
    // 由 `never()` 创建时持有发送端，避免通道被视为关闭
    _sender: Option<Arc<watch::Sender<bool>>>,
}

impl ShutdownSignal {
    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self {
            receiver,
            _sender: None,
        }
    }

    /// 永不触发的信号
    pub fn never() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            receiver,
            _sender: Some(Arc::new(sender)),
        }
    }

    /// 是否已经收到关闭信号
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// 等待关闭信号；发送端全部释放也视为关闭
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|triggered| *triggered).await;
    }
}
