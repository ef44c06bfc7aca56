//! 重试策略
//!
//! 纯函数决策：某次失败后还试不试、隔多久再试。
//! 退避取固定窗口内的随机值，避免机械的请求节奏被目标站点识别

use std::time::Duration;

use rand::Rng;

use crate::config::Config;

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数（总尝试数 = max_retries + 1）
    max_retries: u32,
    /// 退避窗口下限（毫秒）
    backoff_min_ms: u64,
    /// 退避窗口上限（毫秒）
    backoff_max_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_min_ms: u64, backoff_max_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_min_ms,
            backoff_max_ms,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_retries,
            config.backoff_min_ms,
            config.backoff_max_ms,
        )
    }

    /// 已发起 `attempts` 次尝试后是否还允许重试
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }

    /// 下一次重试前的退避时长
    ///
    /// 当前实现与尝试次数无关，统一取窗口内的均匀随机值
    pub fn backoff_delay(&self, _attempts: u32) -> Duration {
        let mut rng = rand::rng();
        let ms = rng.random_range(self.backoff_min_ms..=self.backoff_max_ms);
        Duration::from_millis(ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, 1000, 2000)
    }
}
