//! 有界轮询原语
//!
//! "等待某个谓词在超时前变真"是确认详情切换的基础动作，
//! 与任何页面结构细节无关，所以单独放在基础设施层

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// 以固定间隔轮询谓词，直到它返回 true 或超时
///
/// 返回 true 表示谓词在窗口内成立；false 表示超时。
/// 挂起点只有谓词本身和间隔 sleep，两者都在自然边界结束
pub async fn wait_until<F, Fut>(poll_interval: Duration, timeout: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if probe().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_immediate_success() {
        let ok = wait_until(Duration::from_millis(5), Duration::from_millis(50), || async {
            true
        })
        .await;
        assert!(ok);
    }

    #[tokio::test]
    async fn test_succeeds_after_polls() {
        let calls = AtomicU32::new(0);
        let ok = wait_until(Duration::from_millis(1), Duration::from_millis(200), || async {
            calls.fetch_add(1, Ordering::SeqCst) >= 2
        })
        .await;
        assert!(ok);
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let ok = wait_until(Duration::from_millis(1), Duration::from_millis(10), || async {
            false
        })
        .await;
        assert!(!ok);
    }
}
