//! 批量扫描运行状态
//!
//! `BatchState` 是一次扫描运行的聚合状态，也是持久化的最小单位。
//! 落盘格式与浏览器扩展时期的存储结构保持一致（camelCase 键名，
//! 单一存储键，整体覆盖写入，完成或停止后删除）。
//!
//! 不变式：
//! - `processed = successes + failures`
//! - `processed ≤ current_index ≤ queue.len()`
//!
//! 状态只由编排器（`BatchScanner`）持有并修改，外部组件只能拿到
//! 快照副本，不会拿到可变引用

use serde::{Deserialize, Serialize};

use crate::models::job::JobRecord;

/// 一次扫描运行的聚合状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    /// 扫描已启动且尚未完成/停止
    pub is_running: bool,

    /// 扫描存活但处理循环被挂起
    pub is_paused: bool,

    /// 待处理队列，插入顺序即列表页枚举顺序
    pub queue: Vec<JobRecord>,

    /// 指向下一条待处理任务的游标
    pub current_index: usize,

    /// 已到达终态的任务数
    pub processed: usize,

    /// 成功数
    pub successes: usize,

    /// 失败数
    pub failures: usize,

    /// 运行开始时间（epoch 毫秒），暂停/恢复不重置
    pub start_time: i64,
}

impl BatchState {
    /// 创建一个空闲状态（尚未启动任何扫描）
    pub fn idle() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            queue: Vec::new(),
            current_index: 0,
            processed: 0,
            successes: 0,
            failures: 0,
            start_time: 0,
        }
    }

    /// 用一批职位 id 开启全新运行，计数器全部清零
    pub fn start(ids: Vec<String>) -> Self {
        let queue = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| JobRecord::new(id, index))
            .collect();

        Self {
            is_running: true,
            is_paused: false,
            queue,
            current_index: 0,
            processed: 0,
            successes: 0,
            failures: 0,
            start_time: chrono::Local::now().timestamp_millis(),
        }
    }

    /// 队列总长度
    pub fn total(&self) -> usize {
        self.queue.len()
    }

    /// 游标是否已走完队列
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    /// 当前游标指向的任务 id（队列已走完时为 None）
    pub fn current_job_id(&self) -> Option<String> {
        self.queue.get(self.current_index).map(|job| job.id.clone())
    }

    /// 记录一次终态结果：推进游标并更新计数器
    pub fn record_outcome(&mut self, success: bool) {
        self.processed += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.current_index += 1;
    }

    /// 尚未到达终态的任务 id（恢复校验用：包含 pending 和
    /// 中断时残留的 processing）
    pub fn unfinished_ids(&self) -> Vec<&str> {
        self.queue
            .iter()
            .filter(|job| !job.status.is_terminal())
            .map(|job| job.id.as_str())
            .collect()
    }

    /// 校验计数器不变式，反序列化出的快照先过这一关
    pub fn invariants_hold(&self) -> bool {
        self.processed == self.successes + self.failures
            && self.processed <= self.current_index
            && self.current_index <= self.queue.len()
    }

    /// 反序列化后按队列位置重建 `index`（该字段不落盘）
    pub fn rebuild_indexes(&mut self) {
        for (index, job) in self.queue.iter_mut().enumerate() {
            job.index = index;
        }
    }

    /// 快照中是否还有能与最新枚举结果对上的未完成任务
    pub fn any_unfinished_in(&self, available_ids: &[String]) -> bool {
        self.unfinished_ids()
            .iter()
            .any(|id| available_ids.iter().any(|a| a == id))
    }
}
