//! 进度上报端口
//!
//! 显示层实现这个 trait 来接收进度快照。
//! 上报没有返回值：投递失败由实现方自行消化，永远不会打断处理循环

use async_trait::async_trait;

use crate::models::ProgressEvent;

/// 进度上报能力
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn emit(&self, event: ProgressEvent);
}
