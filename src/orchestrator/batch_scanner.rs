//! 批量扫描编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个扫描的状态机核心，负责把任务队列跑到终态。
//!
//! ## 核心功能
//!
//! 1. **队列驱动**：严格按入队顺序逐个处理任务，游标单调推进
//! 2. **状态持有**：独占持有并修改 `BatchState`，外部只拿快照
//! 3. **持久化**：每次状态变更后尽力写快照，失败只记日志
//! 4. **进度外发**：每次状态迁移和任务完成后发进度事件
//! 5. **控制信号**：在循环边界响应 pause / resume / stop
//! 6. **恢复**：进程重启后可从快照续跑（每个实例至多尝试一次）
//!
//! ## 状态机
//!
//! ```text
//! idle → starting → running ⇄ paused → { completed | stopped }
//! ```
//!
//! `completed` 在游标走完队列时到达；`stopped` 只能由显式停止信号
//! 到达。两者都会删除持久化快照，之后这次运行不可重放

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::job::JobStatus;
use crate::models::{BatchState, ControlSignal, ProgressEvent, ScanStatus};
use crate::ports::{AnalysisSink, JobInteractor, ProgressReporter, StateStore};
use crate::workflow::{JobCtx, JobFlow, JobOutcome};

/// 扫描控制句柄
///
/// 可克隆，随处发送控制信号；运行已结束时信号被静默忽略
#[derive(Clone)]
pub struct ScanController {
    tx: UnboundedSender<ControlSignal>,
}

impl ScanController {
    pub fn pause(&self) {
        let _ = self.tx.send(ControlSignal::Pause);
    }

    pub fn resume(&self) {
        let _ = self.tx.send(ControlSignal::Resume);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(ControlSignal::Stop);
    }
}

/// 批量扫描编排器
///
/// 每个实例对应一个页面上下文，运行状态由实例独占，
/// 不存在任何模块级全局状态
pub struct BatchScanner {
    flow: JobFlow,
    store: Arc<dyn StateStore>,
    reporter: Arc<dyn ProgressReporter>,
    state: BatchState,
    control_tx: UnboundedSender<ControlSignal>,
    control_rx: UnboundedReceiver<ControlSignal>,
    job_delay_window: (u64, u64),
    resume_attempted: bool,
}

impl BatchScanner {
    pub fn new(
        config: &Config,
        interactor: Arc<dyn JobInteractor>,
        analysis: Arc<dyn AnalysisSink>,
        store: Arc<dyn StateStore>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let flow = JobFlow::new(config, interactor, analysis);

        Self {
            flow,
            store,
            reporter,
            state: BatchState::idle(),
            control_tx,
            control_rx,
            job_delay_window: (config.job_delay_min_ms, config.job_delay_max_ms),
            resume_attempted: false,
        }
    }

    /// 获取控制句柄
    pub fn controller(&self) -> ScanController {
        ScanController {
            tx: self.control_tx.clone(),
        }
    }

    /// 当前运行状态的只读视图
    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// 用一批职位 id 开启全新扫描，跑到终态后返回
    ///
    /// 已有扫描在运行时（同一页面上下文不允许并发运行）按无操作处理
    pub async fn run(&mut self, ids: Vec<String>) -> ScanStatus {
        if self.state.is_running {
            warn!("⚠️ 已有扫描在运行，忽略新的扫描请求");
            return ScanStatus::Processing;
        }

        // 空闲期间积压的控制信号对新运行无效，直接丢弃
        while self.control_rx.try_recv().is_ok() {}

        info!("🚀 开始批量扫描，共 {} 个职位", ids.len());
        self.state = BatchState::start(ids);
        self.persist().await;
        self.emit(ScanStatus::Starting, None).await;

        self.run_loop().await
    }

    /// 从持久化快照恢复扫描
    ///
    /// 接受条件：快照处于运行态、计数器不变式成立、且至少有一个
    /// 未完成任务仍能在最新枚举结果里找到。每个实例至多恢复一次，
    /// 不满足条件时返回 None，调用方应改走全新扫描
    pub async fn resume(
        &mut self,
        mut snapshot: BatchState,
        available_ids: &[String],
    ) -> Option<ScanStatus> {
        if self.state.is_running {
            warn!("⚠️ 已有扫描在运行，忽略恢复请求");
            return None;
        }
        if self.resume_attempted {
            debug!("本实例已尝试过恢复，忽略");
            return None;
        }
        self.resume_attempted = true;

        if !snapshot.is_running {
            debug!("快照不处于运行态，无需恢复");
            return None;
        }
        if !snapshot.invariants_hold() {
            warn!("⚠️ 快照计数器不一致，按不可恢复处理");
            return None;
        }

        snapshot.rebuild_indexes();
        if !snapshot.any_unfinished_in(available_ids) {
            warn!("⚠️ 快照中的未完成职位已不在列表页上，放弃恢复");
            return None;
        }

        // 空闲期间积压的控制信号对恢复的运行无效，直接丢弃
        while self.control_rx.try_recv().is_ok() {}

        info!(
            "🔄 从快照恢复扫描: 已处理 {}/{}，从第 {} 个继续",
            snapshot.processed,
            snapshot.total(),
            snapshot.current_index + 1
        );
        self.state = snapshot;
        self.emit(ScanStatus::Resuming, self.state.current_job_id())
            .await;

        Some(self.run_loop().await)
    }

    /// 处理循环
    ///
    /// 每轮迭代开头检查控制信号；暂停把循环停在任务边界，
    /// 不会打断已经开始的尝试
    async fn run_loop(&mut self) -> ScanStatus {
        loop {
            self.drain_control().await;

            if self.state.is_running && self.state.is_paused {
                info!("⏸️ 扫描已暂停，位置停在第 {} 个任务", self.state.current_index + 1);
                self.emit(ScanStatus::Paused, self.state.current_job_id())
                    .await;
                self.wait_while_paused().await;

                if self.state.is_running {
                    info!("▶️ 扫描恢复");
                    self.emit(ScanStatus::Resuming, self.state.current_job_id())
                        .await;
                }
            }

            if !self.state.is_running {
                return self.finish_stopped().await;
            }
            if self.state.is_complete() {
                return self.finish_completed().await;
            }

            let index = self.state.current_index;
            let ctx = JobCtx::new(
                self.state.queue[index].id.clone(),
                index + 1,
                self.state.total(),
            );

            info!("\n{}", "─".repeat(30));
            info!("{} 开始处理", ctx);

            self.state.queue[index].status = JobStatus::Processing;
            self.persist().await;
            self.emit(ScanStatus::Processing, Some(ctx.job_id.clone()))
                .await;

            let outcome = self.flow.run(&mut self.state.queue[index], &ctx).await;
            self.state.record_outcome(outcome == JobOutcome::Success);
            self.persist().await;
            self.emit(ScanStatus::Processing, Some(ctx.job_id.clone()))
                .await;

            // 任务间随机延迟，避免过于规律的访问节奏
            if !self.state.is_complete() {
                let delay = self.next_job_delay();
                debug!("任务间延迟 {} ms", delay.as_millis());
                sleep(delay).await;
            }
        }
    }

    /// 把积压的控制信号全部应用掉
    async fn drain_control(&mut self) {
        while let Ok(signal) = self.control_rx.try_recv() {
            self.apply_signal(signal).await;
        }
    }

    /// 暂停期间停在控制通道上，等恢复或停止
    async fn wait_while_paused(&mut self) {
        while self.state.is_running && self.state.is_paused {
            match self.control_rx.recv().await {
                Some(signal) => self.apply_signal(signal).await,
                None => {
                    // 控制端全部失联，挂起状态永远无法恢复，按停止处理
                    warn!("控制通道已关闭，按停止处理");
                    self.apply_signal(ControlSignal::Stop).await;
                }
            }
        }
    }

    async fn apply_signal(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::Pause => {
                if self.state.is_running && !self.state.is_paused {
                    info!("⏸️ 收到暂停信号");
                    self.state.is_paused = true;
                    self.persist().await;
                }
            }
            ControlSignal::Resume => {
                if self.state.is_running && self.state.is_paused {
                    info!("▶️ 收到恢复信号");
                    self.state.is_paused = false;
                    self.persist().await;
                }
            }
            ControlSignal::Stop => {
                if self.state.is_running {
                    info!("🛑 收到停止信号");
                    self.state.is_running = false;
                    self.state.is_paused = false;
                }
            }
        }
    }

    async fn finish_completed(&mut self) -> ScanStatus {
        self.state.is_running = false;

        // 完成的运行不可重放，快照必须删掉
        if let Err(e) = self.store.clear().await {
            warn!("⚠️ 删除快照失败: {}", e);
        }
        self.emit(ScanStatus::Completed, None).await;

        info!(
            "✅ 扫描完成: 成功 {} / 失败 {} / 共 {}",
            self.state.successes,
            self.state.failures,
            self.state.total()
        );
        ScanStatus::Completed
    }

    async fn finish_stopped(&mut self) -> ScanStatus {
        if let Err(e) = self.store.clear().await {
            warn!("⚠️ 删除快照失败: {}", e);
        }
        self.emit(ScanStatus::Stopped, None).await;

        info!(
            "🛑 扫描已停止: 处理到 {}/{}",
            self.state.processed,
            self.state.total()
        );
        ScanStatus::Stopped
    }

    /// 尽力写快照，失败不打断循环
    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.state).await {
            warn!("⚠️ 保存扫描状态失败: {}", e);
        }
    }

    async fn emit(&self, status: ScanStatus, current_job_id: Option<String>) {
        self.reporter
            .emit(ProgressEvent::snapshot(&self.state, status, current_job_id))
            .await;
    }

    fn next_job_delay(&self) -> Duration {
        let (min, max) = self.job_delay_window;
        let mut rng = rand::rng();
        Duration::from_millis(rng.random_range(min..=max))
    }
}
