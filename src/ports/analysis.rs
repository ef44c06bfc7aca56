//! 分析传输端口
//!
//! 编排器只负责把抽取到的职位描述递交出去，不等待分析结果再继续循环

use async_trait::async_trait;

use crate::models::JobAnalysis;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("分析请求失败 ({endpoint}): {message}")]
    RequestFailed { endpoint: String, message: String },

    #[error("分析服务返回错误响应 ({endpoint}): status={status:?}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("分析结果解析失败: {0}")]
    ParseFailed(String),
}

/// 分析递交能力
#[async_trait]
pub trait AnalysisSink: Send + Sync {
    /// 递交一条职位描述，返回（可能是模拟的）分析报告
    async fn analyze(&self, job_id: &str, text: &str) -> Result<JobAnalysis, AnalysisError>;
}
