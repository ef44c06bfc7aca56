use std::sync::Arc;
use std::time::Duration;

use job_batch_scan::browser::connect_to_browser_and_page;
use job_batch_scan::infrastructure::JsExecutor;
use job_batch_scan::orchestrator::BatchScanner;
use job_batch_scan::services::{
    JsonSnapshotStore, MockAnalysisClient, PageInteractor, ProgressChannel,
};
use job_batch_scan::utils::logging;
use job_batch_scan::Config;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 测试浏览器连接
    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_enumerate_job_cards() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 连接浏览器
    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let interactor = PageInteractor::new(
        JsExecutor::new(page),
        Duration::from_millis(config.confirm_poll_ms),
    );

    let ids = interactor.enumerate_job_ids().await.expect("枚举职位失败");
    println!("找到 {} 个职位卡片", ids.len());
}

#[tokio::test]
#[ignore]
async fn test_scan_single_page() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 连接浏览器
    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await
    .expect("连接浏览器失败");

    let interactor = Arc::new(PageInteractor::new(
        JsExecutor::new(page),
        Duration::from_millis(config.confirm_poll_ms),
    ));

    let ids = interactor.enumerate_job_ids().await.expect("枚举职位失败");
    assert!(!ids.is_empty(), "列表页上应该有职位卡片");

    let mut scanner = BatchScanner::new(
        &config,
        interactor,
        Arc::new(MockAnalysisClient::new()),
        Arc::new(JsonSnapshotStore::new(&config.state_file)),
        Arc::new(ProgressChannel::new(config.progress_buffer_capacity)),
    );

    let status = scanner.run(ids).await;
    println!(
        "扫描结束: {:?}，成功 {}/{}",
        status,
        scanner.state().successes,
        scanner.state().total()
    );
}
