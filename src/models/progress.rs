//! 进度事件与控制信号
//!
//! 对外的进度消息结构沿用扩展时期的消息格式（camelCase），
//! 显示层只消费这里的快照，拿不到运行状态本体

use serde::{Deserialize, Serialize};

use crate::models::batch::BatchState;

/// 扫描运行的生命周期状态（进度事件里携带）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// 队列构建完毕，首个快照已写入
    Starting,
    /// 处理循环运行中
    Processing,
    /// 循环被挂起，位置保留
    Paused,
    /// 从暂停或持久化快照恢复
    Resuming,
    /// 队列走完，正常结束
    Completed,
    /// 被显式停止，本次运行不可恢复
    Stopped,
}

/// 一条对外进度事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub total: usize,
    pub processed: usize,
    pub successes: usize,
    pub failures: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job_id: Option<String>,
    pub status: ScanStatus,
}

impl ProgressEvent {
    /// 从运行状态生成一条事件快照
    pub fn snapshot(state: &BatchState, status: ScanStatus, current_job_id: Option<String>) -> Self {
        Self {
            total: state.total(),
            processed: state.processed,
            successes: state.successes,
            failures: state.failures,
            current_job_id,
            status,
        }
    }
}

/// 进入编排器的控制信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Pause,
    Resume,
    Stop,
}
