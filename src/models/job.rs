//! 职位扫描任务记录
//!
//! 一条 `JobRecord` 对应列表页上的一个职位卡片，是批量扫描的最小工作单元

use serde::{Deserialize, Serialize};

/// 任务状态
///
/// 状态只能沿 `Pending → Processing → {Success | Failed}` 单向流转，
/// 离开 `Pending` 后不会再回退（恢复运行时终态任务保持原样）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// 等待处理
    Pending,
    /// 正在处理
    Processing,
    /// 处理成功
    Success,
    /// 重试耗尽后失败
    Failed,
}

impl JobStatus {
    /// 是否已到达终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// 单个职位的扫描任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// 职位卡片的稳定标识（列表页的 data-occludable-job-id）
    pub id: String,

    /// 入队时的原始位置，仅用于排序和日志，不落盘
    #[serde(skip)]
    pub index: usize,

    /// 已发起的交互尝试次数
    pub attempts: u32,

    /// 当前状态
    pub status: JobStatus,
}

impl JobRecord {
    /// 创建一条待处理任务
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
            attempts: 0,
            status: JobStatus::Pending,
        }
    }
}
