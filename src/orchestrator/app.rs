//! 应用装配 - 编排层
//!
//! 持有浏览器等稀缺资源，把各适配器接到 `BatchScanner` 上并负责
//! 启动路径的选择：能从快照恢复就恢复，否则开全新扫描

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::BatchState;
use crate::orchestrator::batch_scanner::BatchScanner;
use crate::ports::{AnalysisSink, StateStore};
use crate::services::{
    HttpAnalysisClient, JsonSnapshotStore, MockAnalysisClient, PageInteractor, ProgressChannel,
};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    scanner: BatchScanner,
    interactor: Arc<PageInteractor>,
    store: Arc<JsonSnapshotStore>,
    progress: Arc<ProgressChannel>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        // 连接或启动浏览器
        let (browser, page) = if config.use_headless {
            browser::launch_headless_browser(
                &config.target_url,
                config.chrome_executable.as_deref(),
            )
            .await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
                config.target_title.as_deref(),
            )
            .await?
        };

        // 创建页面交互适配器（持有 page）
        let executor = JsExecutor::new(page);
        let interactor = Arc::new(PageInteractor::new(
            executor,
            Duration::from_millis(config.confirm_poll_ms),
        ));

        let analysis: Arc<dyn AnalysisSink> = if config.use_mock_analysis {
            Arc::new(MockAnalysisClient::new())
        } else {
            Arc::new(HttpAnalysisClient::new(&config.analysis_api_base_url))
        };

        let store = Arc::new(JsonSnapshotStore::new(&config.state_file));
        let progress = Arc::new(ProgressChannel::new(config.progress_buffer_capacity));

        let scanner = BatchScanner::new(
            &config,
            interactor.clone(),
            analysis,
            store.clone(),
            progress.clone(),
        );

        Ok(Self {
            config,
            _browser: browser,
            scanner,
            interactor,
            store,
            progress,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        // 显示层就绪握手：这里的"显示层"是日志输出
        let mut progress_rx = self.progress.attach();
        tokio::spawn(async move {
            while let Some(event) = progress_rx.recv().await {
                debug!(
                    "进度事件: {:?} {}/{} (成功 {} 失败 {})",
                    event.status, event.processed, event.total, event.successes, event.failures
                );
            }
        });

        // Ctrl-C 映射为停止信号，在任务边界生效
        let controller = self.scanner.controller();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到 Ctrl-C，发送停止信号");
                controller.stop();
            }
        });

        // 枚举列表页上当前可见的职位
        let ids = self.interactor.enumerate_job_ids().await?;

        let status = match self.try_resume(&ids).await {
            Some(status) => status,
            None => {
                if ids.is_empty() {
                    warn!("⚠️ 列表页上没有找到职位卡片，程序结束");
                    return Ok(());
                }
                info!("✓ 找到 {} 个待扫描职位", ids.len());
                self.scanner.run(ids).await
            }
        };

        logging::print_final_stats(self.scanner.state(), status, &self.config);
        Ok(())
    }

    /// 获取控制句柄（交给外部控制面）
    pub fn controller(&self) -> crate::orchestrator::ScanController {
        self.scanner.controller()
    }

    /// 有可用快照就尝试恢复，拒绝的过期快照顺手清掉
    async fn try_resume(&mut self, available_ids: &[String]) -> Option<crate::models::ScanStatus> {
        let snapshot = self.load_snapshot().await?;
        match self.scanner.resume(snapshot, available_ids).await {
            Some(status) => Some(status),
            None => {
                if let Err(e) = self.store.clear().await {
                    warn!("清除过期快照失败: {}", e);
                }
                None
            }
        }
    }

    async fn load_snapshot(&self) -> Option<BatchState> {
        match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // 读不出来就当没有可恢复的运行
                warn!("读取快照失败，按全新扫描处理: {}", e);
                None
            }
        }
    }
}
