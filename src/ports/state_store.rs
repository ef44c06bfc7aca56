//! 运行状态持久化端口
//!
//! 编排器把快照的保存/读取/清除委托给这里，自己不碰存储细节。
//! 持久化是尽力而为：保存失败只记日志，不中断扫描

use async_trait::async_trait;

use crate::models::BatchState;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("读取快照失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("写入快照失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("删除快照失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("快照内容损坏 ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 快照存取能力
#[async_trait]
pub trait StateStore: Send + Sync {
    /// 整体覆盖写入快照
    async fn save(&self, state: &BatchState) -> Result<(), StoreError>;

    /// 读取快照，不存在时返回 None
    async fn load(&self) -> Result<Option<BatchState>, StoreError>;

    /// 删除快照（完成或停止后调用）
    async fn clear(&self) -> Result<(), StoreError>;
}
