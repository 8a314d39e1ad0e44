use std::sync::Arc;

use checker_core::ShutdownSignal;
use tokio::sync::watch;
use tracing::{debug, info};

/// 优雅关闭管理器
///
/// 持有关闭信号的发送端，克隆后共享同一个信号。
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownManager {
    /// 创建新的关闭管理器
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// 订阅关闭信号，关闭后订阅得到的信号立即处于触发状态
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal::new(self.sender.subscribe())
    }

    /// 触发关闭，重复调用无效果
    pub fn shutdown(&self) {
        if self.sender.send_replace(true) {
            debug!("关闭管理器已经触发过关闭");
            return;
        }
        info!(
            "触发系统关闭，通知 {} 个订阅者",
            self.sender.receiver_count()
        );
    }

    /// 检查是否已经关闭
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
