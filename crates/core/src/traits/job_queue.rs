use std::time::Duration;

use async_trait::async_trait;

use crate::CheckerResult;

/// 任务队列抽象接口
///
/// 负载是已编码的字节，编解码由调用方负责。
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 发布负载到指定队列
    async fn publish(&self, queue: &str, payload: &[u8]) -> CheckerResult<()>;

    /// 从指定队列取出一条负载，`timeout` 内没有数据时返回 `None`
    async fn receive(&self, queue: &str, timeout: Duration) -> CheckerResult<Option<Vec<u8>>>;

    /// 创建队列
    async fn create_queue(&self, queue: &str) -> CheckerResult<()>;

    /// 获取队列中的负载数量
    async fn queue_size(&self, queue: &str) -> CheckerResult<u64>;

    /// 清空队列
    async fn purge_queue(&self, queue: &str) -> CheckerResult<()>;

    /// 断开连接
    async fn close(&self) -> CheckerResult<()>;
}
