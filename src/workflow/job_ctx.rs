//! 任务处理上下文
//!
//! 封装"我正在处理队列里第几个职位"这一信息

use std::fmt::Display;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 职位卡片 id
    pub job_id: String,

    /// 队列中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 队列总长度
    pub total: usize,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(job_id: String, position: usize, total: usize) -> Self {
        Self {
            job_id,
            position,
            total,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[职位 {}/{} id#{}]", self.position, self.total, self.job_id)
    }
}
