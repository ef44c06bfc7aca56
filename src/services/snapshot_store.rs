//! 快照文件存储 - 业务能力层
//!
//! 把 `BatchState` 以 JSON 形式整体写入单个众所周知的文件，
//! 对应扩展时期"单一存储键、整体覆盖、完成后删除"的语义

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::models::BatchState;
use crate::ports::{StateStore, StoreError};

/// JSON 快照存储
pub struct JsonSnapshotStore {
    path: String,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonSnapshotStore {
    async fn save(&self, state: &BatchState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: self.path.clone(),
                source: e,
            })?;

        debug!("快照已写入: {}", self.path);
        Ok(())
    }

    async fn load(&self) -> Result<Option<BatchState>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let mut state: BatchState =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;

        // index 不落盘，读回后按队列位置重建
        state.rebuild_indexes();
        Ok(Some(state))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("快照已删除: {}", self.path);
                Ok(())
            }
            // 文件不存在视为已清除
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
