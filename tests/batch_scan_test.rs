//! 批量扫描编排器集成测试
//!
//! 全部用桩实现的端口驱动，不依赖真实浏览器

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use job_batch_scan::models::{
    BatchState, JobAnalysis, JobStatus, MatchAnalysis, ProgressEvent, ScanStatus,
};
use job_batch_scan::orchestrator::BatchScanner;
use job_batch_scan::ports::{
    AnalysisError, AnalysisSink, JobInteractor, ProgressReporter, ScanError, StateStore,
    StoreError,
};
use job_batch_scan::services::ProgressChannel;
use job_batch_scan::Config;

// ========== 桩实现 ==========

/// 按脚本行为运行的页面交互桩
#[derive(Default)]
struct ScriptedInteractor {
    /// id -> 前 n 次 activate 失败
    activate_fails: HashMap<String, u32>,
    /// 永远找不到的 id
    missing: HashSet<String>,
    /// 详情确认永远超时的 id
    never_confirm: HashSet<String>,
    /// 描述为空的 id
    empty_extract: HashSet<String>,
    /// id -> 已发起的尝试次数
    attempts: Mutex<HashMap<String, u32>>,
    last_activated: Mutex<Option<String>>,
}

impl ScriptedInteractor {
    fn new() -> Self {
        Self::default()
    }

    fn with_activate_fails(mut self, id: &str, times: u32) -> Self {
        self.activate_fails.insert(id.to_string(), times);
        self
    }

    fn with_missing(mut self, id: &str) -> Self {
        self.missing.insert(id.to_string());
        self
    }

    fn with_never_confirm(mut self, id: &str) -> Self {
        self.never_confirm.insert(id.to_string());
        self
    }

    fn with_empty_extract(mut self, id: &str) -> Self {
        self.empty_extract.insert(id.to_string());
        self
    }

    fn attempts_for(&self, id: &str) -> u32 {
        self.attempts.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl JobInteractor for ScriptedInteractor {
    async fn activate(&self, id: &str) -> Result<(), ScanError> {
        let seen = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(id.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if self.missing.contains(id) {
            return Err(ScanError::NotFound { id: id.to_string() });
        }
        if let Some(&fails) = self.activate_fails.get(id) {
            if seen <= fails {
                return Err(ScanError::ActivationFailed { id: id.to_string() });
            }
        }

        *self.last_activated.lock().unwrap() = Some(id.to_string());
        Ok(())
    }

    async fn await_confirmation(&self, id: &str, timeout: Duration) -> Result<(), ScanError> {
        if self.never_confirm.contains(id) {
            return Err(ScanError::ConfirmationTimeout {
                id: id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    async fn extract(&self) -> Result<String, ScanError> {
        let last = self.last_activated.lock().unwrap().clone();
        match last {
            Some(id) if self.empty_extract.contains(&id) => Ok(String::new()),
            Some(_) => Ok("我们正在寻找一位资深前端工程师，负责核心产品的界面开发。".to_string()),
            None => Ok(String::new()),
        }
    }
}

/// 内存快照存储
#[derive(Default)]
struct MemoryStore {
    inner: Mutex<Option<BatchState>>,
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn save(&self, state: &BatchState) -> Result<(), StoreError> {
        *self.inner.lock().unwrap() = Some(state.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<BatchState>, StoreError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock().unwrap() = None;
        Ok(())
    }
}

/// 收集所有进度事件的上报桩
#[derive(Default)]
struct CollectingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressReporter for CollectingReporter {
    async fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// 记录递交的分析桩
#[derive(Default)]
struct RecordingAnalysis {
    submitted: Mutex<Vec<String>>,
}

#[async_trait]
impl AnalysisSink for RecordingAnalysis {
    async fn analyze(&self, job_id: &str, _text: &str) -> Result<JobAnalysis, AnalysisError> {
        self.submitted.lock().unwrap().push(job_id.to_string());
        Ok(JobAnalysis {
            job_title: "Senior Frontend Engineer".to_string(),
            company: "Tech Innovations Inc.".to_string(),
            match_analysis: MatchAnalysis {
                score: 75,
                summary: "ok".to_string(),
                pros: vec![],
                cons: vec![],
            },
        })
    }
}

// ========== 辅助函数 ==========

/// 测试用的快速配置（毫秒级窗口）
fn fast_config() -> Config {
    Config {
        max_retries: 2,
        backoff_min_ms: 1,
        backoff_max_ms: 2,
        job_delay_min_ms: 0,
        job_delay_max_ms: 1,
        confirm_timeout_ms: 20,
        confirm_poll_ms: 2,
        ..Config::default()
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// 任意时刻的事件快照都必须满足计数器不变式
fn assert_event_invariants(event: &ProgressEvent) {
    assert_eq!(
        event.processed,
        event.successes + event.failures,
        "processed 必须等于 successes + failures"
    );
    assert!(event.processed <= event.total, "processed 不能超过队列长度");
}

struct Harness {
    scanner: BatchScanner,
    interactor: Arc<ScriptedInteractor>,
    store: Arc<MemoryStore>,
    reporter: Arc<CollectingReporter>,
    analysis: Arc<RecordingAnalysis>,
}

fn harness(config: &Config, interactor: ScriptedInteractor) -> Harness {
    let interactor = Arc::new(interactor);
    let store = Arc::new(MemoryStore::default());
    let reporter = Arc::new(CollectingReporter::default());
    let analysis = Arc::new(RecordingAnalysis::default());

    let scanner = BatchScanner::new(
        config,
        interactor.clone(),
        analysis.clone(),
        store.clone(),
        reporter.clone(),
    );

    Harness {
        scanner,
        interactor,
        store,
        reporter,
        analysis,
    }
}

// ========== 测试 ==========

/// 队列 [A, B, C]：A 一次成功，B 全部失败，C 第二次成功
#[tokio::test]
async fn test_scan_example_three_jobs() {
    let config = fast_config();
    let mut h = harness(
        &config,
        ScriptedInteractor::new()
            .with_missing("B")
            .with_activate_fails("C", 1),
    );

    let status = h.scanner.run(ids(&["A", "B", "C"])).await;
    assert_eq!(status, ScanStatus::Completed);

    let state = h.scanner.state();
    assert_eq!(state.total(), 3);
    assert_eq!(state.processed, 3);
    assert_eq!(state.successes, 2);
    assert_eq!(state.failures, 1);
    assert!(!state.is_running);

    assert_eq!(state.queue[0].status, JobStatus::Success);
    assert_eq!(state.queue[0].attempts, 1);
    assert_eq!(state.queue[1].status, JobStatus::Failed);
    // 重试上限 2 → 总共 3 次尝试
    assert_eq!(state.queue[1].attempts, 3);
    assert_eq!(h.interactor.attempts_for("B"), 3);
    assert_eq!(state.queue[2].status, JobStatus::Success);
    assert_eq!(state.queue[2].attempts, 2);

    // 完成后快照必须被删除
    assert!(tokio_test::assert_ok!(h.store.load().await).is_none());

    // 每条进度事件都满足不变式，最后一条是 completed
    let events = h.reporter.events();
    assert!(!events.is_empty());
    for event in &events {
        assert_event_invariants(event);
    }
    assert_eq!(events.first().unwrap().status, ScanStatus::Starting);
    assert_eq!(events.last().unwrap().status, ScanStatus::Completed);

    // 成功任务的文本被递交给了分析服务
    tokio::time::sleep(Duration::from_millis(50)).await;
    let submitted = h.analysis.submitted.lock().unwrap().clone();
    assert!(submitted.contains(&"A".to_string()));
    assert!(submitted.contains(&"C".to_string()));
    assert!(!submitted.contains(&"B".to_string()));
}

/// 四类失败都走同一条重试通道，耗尽后标记失败且循环继续推进
#[tokio::test]
async fn test_every_failure_kind_is_retried_then_failed() {
    let config = fast_config();
    let mut h = harness(
        &config,
        ScriptedInteractor::new()
            .with_missing("not_found")
            .with_activate_fails("no_click", 99)
            .with_never_confirm("no_confirm")
            .with_empty_extract("empty"),
    );

    let status = h
        .scanner
        .run(ids(&["not_found", "no_click", "no_confirm", "empty", "ok"]))
        .await;
    assert_eq!(status, ScanStatus::Completed);

    let state = h.scanner.state();
    assert_eq!(state.processed, 5);
    assert_eq!(state.failures, 4);
    assert_eq!(state.successes, 1);

    for index in 0..4 {
        assert_eq!(state.queue[index].status, JobStatus::Failed);
        // 每个失败任务都恰好尝试了 3 次
        assert_eq!(state.queue[index].attempts, 3);
    }
    assert_eq!(state.queue[4].status, JobStatus::Success);
}

/// stop 在任务边界生效：删除快照，后续全新扫描从零开始
#[tokio::test]
async fn test_stop_erases_snapshot_and_fresh_scan_starts_zeroed() {
    let mut config = fast_config();
    // 放大任务间延迟，让停止信号稳定落在任务边界前
    config.job_delay_min_ms = 30;
    config.job_delay_max_ms = 40;

    let interactor = Arc::new(ScriptedInteractor::new());
    let store = Arc::new(MemoryStore::default());
    let analysis = Arc::new(RecordingAnalysis::default());
    let progress = Arc::new(ProgressChannel::new(32));

    let mut scanner = BatchScanner::new(
        &config,
        interactor.clone(),
        analysis.clone(),
        store.clone(),
        progress.clone(),
    );
    let controller = scanner.controller();
    let mut rx = progress.attach();

    let driver = tokio::spawn(async move {
        let status = scanner.run(ids(&["a", "b", "c", "d", "e"])).await;
        (status, scanner)
    });

    let mut stopped_event = None;
    while let Some(event) = rx.recv().await {
        assert_event_invariants(&event);
        // 第一个任务完成后发停止信号
        if event.status == ScanStatus::Processing && event.processed == 1 {
            controller.stop();
        }
        if event.status == ScanStatus::Stopped {
            stopped_event = Some(event);
            break;
        }
        if event.status == ScanStatus::Completed {
            panic!("停止信号没有生效");
        }
    }

    let (status, scanner) = driver.await.unwrap();
    assert_eq!(status, ScanStatus::Stopped);

    let stopped_event = stopped_event.unwrap();
    assert!(stopped_event.processed < 5, "停止后不应处理完整个队列");
    assert!(!scanner.state().is_running);

    // 快照已被删除
    assert!(store.load().await.unwrap().is_none());

    // 同一存储上的全新扫描从零开始并正常完成
    let reporter = Arc::new(CollectingReporter::default());
    let mut fresh = BatchScanner::new(
        &fast_config(),
        Arc::new(ScriptedInteractor::new()),
        analysis,
        store.clone(),
        reporter.clone(),
    );
    let status = fresh.run(ids(&["x", "y"])).await;
    assert_eq!(status, ScanStatus::Completed);

    let events = reporter.events();
    let starting = &events[0];
    assert_eq!(starting.status, ScanStatus::Starting);
    assert_eq!(starting.processed, 0);
    assert_eq!(starting.total, 2);
}

/// pause → resume 不改变游标和计数器
#[tokio::test]
async fn test_pause_resume_preserves_counters() {
    let mut config = fast_config();
    config.job_delay_min_ms = 30;
    config.job_delay_max_ms = 40;

    let interactor = Arc::new(ScriptedInteractor::new());
    let store = Arc::new(MemoryStore::default());
    let analysis = Arc::new(RecordingAnalysis::default());
    let progress = Arc::new(ProgressChannel::new(32));

    let mut scanner = BatchScanner::new(
        &config,
        interactor.clone(),
        analysis,
        store.clone(),
        progress.clone(),
    );
    let controller = scanner.controller();
    let mut rx = progress.attach();

    let driver = tokio::spawn(async move {
        let status = scanner.run(ids(&["a", "b", "c"])).await;
        (status, scanner)
    });

    let mut paused_event: Option<ProgressEvent> = None;
    let mut resuming_event: Option<ProgressEvent> = None;

    while let Some(event) = rx.recv().await {
        assert_event_invariants(&event);
        match event.status {
            ScanStatus::Processing if event.processed == 1 && paused_event.is_none() => {
                controller.pause();
            }
            ScanStatus::Paused => {
                // 暂停期间快照保留，且记录了挂起标志
                let snapshot = store.load().await.unwrap().unwrap();
                assert!(snapshot.is_running);
                assert!(snapshot.is_paused);
                paused_event = Some(event);
                controller.resume();
            }
            ScanStatus::Resuming => {
                resuming_event = Some(event);
            }
            ScanStatus::Completed => break,
            _ => {}
        }
    }

    let (status, scanner) = driver.await.unwrap();
    assert_eq!(status, ScanStatus::Completed);
    assert_eq!(scanner.state().processed, 3);

    // 暂停边界两侧计数器一致
    let paused = paused_event.expect("应当出现 paused 事件");
    let resuming = resuming_event.expect("应当出现 resuming 事件");
    assert_eq!(paused.processed, resuming.processed);
    assert_eq!(paused.successes, resuming.successes);
    assert_eq!(paused.failures, resuming.failures);
}

/// 从快照恢复后的终态计数器与不中断运行一致
#[tokio::test]
async fn test_resume_reproduces_uninterrupted_counters() {
    let config = fast_config();

    // 基准：不中断的完整运行
    let mut baseline = harness(
        &config,
        ScriptedInteractor::new()
            .with_missing("B")
            .with_activate_fails("C", 1),
    );
    let status = baseline.scanner.run(ids(&["A", "B", "C"])).await;
    assert_eq!(status, ScanStatus::Completed);
    let expected = baseline.scanner.state().clone();

    // 构造"A 已成功后进程被杀"的快照
    let mut snapshot = BatchState::start(ids(&["A", "B", "C"]));
    snapshot.queue[0].status = JobStatus::Success;
    snapshot.queue[0].attempts = 1;
    snapshot.record_outcome(true);
    assert!(snapshot.invariants_hold());

    // 用相同行为的桩从快照恢复
    let mut resumed = harness(
        &config,
        ScriptedInteractor::new()
            .with_missing("B")
            .with_activate_fails("C", 1),
    );
    let status = resumed
        .scanner
        .resume(snapshot, &ids(&["A", "B", "C"]))
        .await
        .expect("快照应当可恢复");
    assert_eq!(status, ScanStatus::Completed);

    let state = resumed.scanner.state();
    assert_eq!(state.processed, expected.processed);
    assert_eq!(state.successes, expected.successes);
    assert_eq!(state.failures, expected.failures);
    assert_eq!(state.current_index, expected.current_index);

    // 已成功的 A 不会被重跑
    assert_eq!(resumed.interactor.attempts_for("A"), 0);
}

/// 过期快照和重复恢复都被拒绝
#[tokio::test]
async fn test_resume_rejections() {
    let config = fast_config();
    let mut h = harness(&config, ScriptedInteractor::new());

    // 未完成任务都不在最新列表里 → 拒绝
    let mut stale = BatchState::start(ids(&["gone1", "gone2"]));
    stale.queue[0].status = JobStatus::Success;
    stale.record_outcome(true);
    assert!(h
        .scanner
        .resume(stale, &ids(&["other1", "other2"]))
        .await
        .is_none());

    // 同一实例的第二次恢复尝试 → 拒绝（恢复标记）
    let valid = BatchState::start(ids(&["other1"]));
    assert!(h.scanner.resume(valid, &ids(&["other1"])).await.is_none());

    // 非运行态快照 → 拒绝
    let mut h2 = harness(&config, ScriptedInteractor::new());
    let mut idle_snapshot = BatchState::start(ids(&["a"]));
    idle_snapshot.is_running = false;
    assert!(h2.scanner.resume(idle_snapshot, &ids(&["a"])).await.is_none());

    // 计数器不一致的快照 → 拒绝
    let mut h3 = harness(&config, ScriptedInteractor::new());
    let mut broken = BatchState::start(ids(&["a"]));
    broken.processed = 9;
    assert!(h3.scanner.resume(broken, &ids(&["a"])).await.is_none());
}

/// 空闲期间积压的控制信号不影响新运行
#[tokio::test]
async fn test_stale_control_signals_ignored() {
    let config = fast_config();
    let mut h = harness(&config, ScriptedInteractor::new());
    let controller = h.scanner.controller();

    // 运行开始前乱按一通
    controller.stop();
    controller.pause();

    let status = h.scanner.run(ids(&["a", "b"])).await;
    assert_eq!(status, ScanStatus::Completed);
    assert_eq!(h.scanner.state().processed, 2);
}

/// 持久化失败只影响落盘，不打断扫描
#[tokio::test]
async fn test_store_failure_does_not_abort_run() {
    struct FailingStore;

    #[async_trait]
    impl StateStore for FailingStore {
        async fn save(&self, _state: &BatchState) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed {
                path: "/nonexistent/state.json".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }

        async fn load(&self) -> Result<Option<BatchState>, StoreError> {
            Ok(None)
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::DeleteFailed {
                path: "/nonexistent/state.json".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    let config = fast_config();
    let reporter = Arc::new(CollectingReporter::default());
    let mut scanner = BatchScanner::new(
        &config,
        Arc::new(ScriptedInteractor::new()),
        Arc::new(RecordingAnalysis::default()),
        Arc::new(FailingStore),
        reporter.clone(),
    );

    let status = scanner.run(ids(&["a", "b"])).await;
    assert_eq!(status, ScanStatus::Completed);
    assert_eq!(scanner.state().successes, 2);
}
