//! 单个职位的处理流程 - 流程层
//!
//! 核心职责：定义"一个职位"的完整处理流程
//!
//! 流程顺序：
//! 1. activate → 等待详情确认 → 抽取文本
//! 2. 抽取成功 → 递交分析服务（不等待结果）
//! 3. 任一步失败 → 按重试策略退避重试，耗尽后判定失败

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::job::{JobRecord, JobStatus};
use crate::ports::{AnalysisSink, JobInteractor, ScanError};
use crate::utils::logging;
use crate::workflow::job_ctx::JobCtx;
use crate::workflow::retry::RetryPolicy;

/// 单个任务的终态结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// 抽取成功，文本已递交分析
    Success,
    /// 重试耗尽后失败
    Failed,
}

/// 职位处理流程
///
/// - 编排单个职位的"激活 → 确认 → 抽取 → 递交"
/// - 失败时咨询重试策略，自己负责退避等待
/// - 不持有任何页面资源，只依赖端口能力
/// - 不碰队列和计数器（那是编排层的事）
pub struct JobFlow {
    interactor: Arc<dyn JobInteractor>,
    analysis: Arc<dyn AnalysisSink>,
    retry: RetryPolicy,
    confirm_timeout: Duration,
    verbose_logging: bool,
}

impl JobFlow {
    /// 创建新的职位处理流程
    pub fn new(
        config: &Config,
        interactor: Arc<dyn JobInteractor>,
        analysis: Arc<dyn AnalysisSink>,
    ) -> Self {
        Self {
            interactor,
            analysis,
            retry: RetryPolicy::from_config(config),
            confirm_timeout: Duration::from_millis(config.confirm_timeout_ms),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 把一个任务跑到终态
    ///
    /// 每次尝试前递增 `attempts`；失败后按策略退避重试，
    /// 耗尽后标记失败返回。任务状态在这里落到 Success / Failed
    pub async fn run(&self, job: &mut JobRecord, ctx: &JobCtx) -> JobOutcome {
        loop {
            job.attempts += 1;

            match self.attempt(&job.id).await {
                Ok(text) => {
                    info!(
                        "{} ✓ 第 {} 次尝试成功，抽取 {} 字符",
                        ctx,
                        job.attempts,
                        text.chars().count()
                    );
                    // 详细日志（如果启用）
                    if self.verbose_logging {
                        info!("{} 描述预览: {}", ctx, logging::truncate_text(&text, 80));
                    }
                    self.dispatch_analysis(&job.id, text);
                    job.status = JobStatus::Success;
                    return JobOutcome::Success;
                }
                Err(e) => {
                    warn!("{} ⚠️ 第 {} 次尝试失败: {}", ctx, job.attempts, e);

                    if self.retry.should_retry(job.attempts) {
                        let delay = self.retry.backoff_delay(job.attempts);
                        debug!("{} 退避 {} ms 后重试", ctx, delay.as_millis());
                        sleep(delay).await;
                    } else {
                        error!("{} ❌ 重试耗尽（共 {} 次尝试），判定失败", ctx, job.attempts);
                        job.status = JobStatus::Failed;
                        return JobOutcome::Failed;
                    }
                }
            }
        }
    }

    /// 一次完整的交互尝试
    async fn attempt(&self, id: &str) -> Result<String, ScanError> {
        self.interactor.activate(id).await?;
        self.interactor
            .await_confirmation(id, self.confirm_timeout)
            .await?;

        let text = self.interactor.extract().await?;
        if text.trim().is_empty() {
            return Err(ScanError::ExtractionEmpty { id: id.to_string() });
        }
        Ok(text)
    }

    /// 递交分析服务，不阻塞处理循环
    fn dispatch_analysis(&self, job_id: &str, text: String) {
        let sink = Arc::clone(&self.analysis);
        let id = job_id.to_string();

        tokio::spawn(async move {
            match sink.analyze(&id, &text).await {
                Ok(report) => {
                    info!(
                        "✨ [职位 id#{}] 分析完成: {} @ {} 匹配分 {}",
                        id, report.job_title, report.company, report.match_analysis.score
                    );
                }
                Err(e) => {
                    warn!("[职位 id#{}] 分析递交失败: {}", id, e);
                }
            }
        });
    }
}
