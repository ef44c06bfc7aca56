use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 职位列表页 URL
    pub target_url: String,
    /// 是否启动无头浏览器（false 时连接已运行的浏览器）
    pub use_headless: bool,
    /// 无头模式下的浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 连接模式下按标题匹配已打开的标签页
    pub target_title: Option<String>,
    /// 快照文件路径（单一存储键）
    pub state_file: String,
    /// 分析服务地址
    pub analysis_api_base_url: String,
    /// 是否使用内置的模拟分析服务
    pub use_mock_analysis: bool,
    /// 单个任务的最大重试次数（总尝试数 = 重试数 + 1）
    pub max_retries: u32,
    /// 重试退避窗口下限（毫秒）
    pub backoff_min_ms: u64,
    /// 重试退避窗口上限（毫秒）
    pub backoff_max_ms: u64,
    /// 任务间随机延迟下限（毫秒）
    pub job_delay_min_ms: u64,
    /// 任务间随机延迟上限（毫秒）
    pub job_delay_max_ms: u64,
    /// 详情确认超时（毫秒）
    pub confirm_timeout_ms: u64,
    /// 详情确认轮询间隔（毫秒）
    pub confirm_poll_ms: u64,
    /// 显示层就绪前进度事件的缓冲上限
    pub progress_buffer_capacity: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://www.linkedin.com/jobs/search/".to_string(),
            use_headless: false,
            chrome_executable: None,
            target_title: None,
            state_file: "scan_state.json".to_string(),
            analysis_api_base_url: "http://localhost:8787".to_string(),
            use_mock_analysis: true,
            max_retries: 2,
            backoff_min_ms: 1000,
            backoff_max_ms: 2000,
            job_delay_min_ms: 300,
            job_delay_max_ms: 1200,
            confirm_timeout_ms: 10_000,
            confirm_poll_ms: 500,
            progress_buffer_capacity: 64,
            verbose_logging: false,
            output_log_file: "scan_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            use_headless: std::env::var("USE_HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.use_headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            target_title: std::env::var("TARGET_TITLE").ok().or(default.target_title),
            state_file: std::env::var("STATE_FILE").unwrap_or(default.state_file),
            analysis_api_base_url: std::env::var("ANALYSIS_API_BASE_URL").unwrap_or(default.analysis_api_base_url),
            use_mock_analysis: std::env::var("USE_MOCK_ANALYSIS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.use_mock_analysis),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            backoff_min_ms: std::env::var("BACKOFF_MIN_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_min_ms),
            backoff_max_ms: std::env::var("BACKOFF_MAX_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_max_ms),
            job_delay_min_ms: std::env::var("JOB_DELAY_MIN_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.job_delay_min_ms),
            job_delay_max_ms: std::env::var("JOB_DELAY_MAX_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.job_delay_max_ms),
            confirm_timeout_ms: std::env::var("CONFIRM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.confirm_timeout_ms),
            confirm_poll_ms: std::env::var("CONFIRM_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.confirm_poll_ms),
            progress_buffer_capacity: std::env::var("PROGRESS_BUFFER_CAPACITY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.progress_buffer_capacity),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 从 TOML 配置文件加载，缺省键回落到默认值
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::FileParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验窗口型配置项的上下限关系
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_min_ms > self.backoff_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "backoff_min_ms".to_string(),
                reason: format!(
                    "下限 {} 大于上限 {}",
                    self.backoff_min_ms, self.backoff_max_ms
                ),
            });
        }
        if self.job_delay_min_ms > self.job_delay_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "job_delay_min_ms".to_string(),
                reason: format!(
                    "下限 {} 大于上限 {}",
                    self.job_delay_min_ms, self.job_delay_max_ms
                ),
            });
        }
        if self.confirm_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirm_poll_ms".to_string(),
                reason: "轮询间隔不能为 0".to_string(),
            });
        }
        Ok(())
    }
}
