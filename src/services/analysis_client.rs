//! 分析客户端 - 业务能力层
//!
//! 两个 `AnalysisSink` 实现：
//! - `MockAnalysisClient` - 延迟两秒后返回固定报告，和扩展时期的
//!   service worker 行为一致，开发期默认使用
//! - `HttpAnalysisClient` - 把职位描述 POST 给真实分析后端

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::sleep;
use tracing::debug;

use crate::models::{JobAnalysis, MatchAnalysis};
use crate::ports::{AnalysisError, AnalysisSink};

/// 模拟分析服务
pub struct MockAnalysisClient {
    delay: Duration,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        // 模拟后端处理耗时
        Self {
            delay: Duration::from_secs(2),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    fn canned_report() -> JobAnalysis {
        JobAnalysis {
            job_title: "Senior Frontend Engineer".to_string(),
            company: "Tech Innovations Inc.".to_string(),
            match_analysis: MatchAnalysis {
                score: 75,
                summary: "Good fit for frontend skills, but lacks backend experience mentioned in the JD."
                    .to_string(),
                pros: vec![
                    "Strong experience with React and TypeScript.".to_string(),
                    "CV shows projects using GraphQL.".to_string(),
                ],
                cons: vec![
                    "JD mentions Node.js experience, which is not prominent in the CV.".to_string(),
                    "5 years of experience required, CV shows 4 years.".to_string(),
                ],
            },
        }
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisSink for MockAnalysisClient {
    async fn analyze(&self, job_id: &str, text: &str) -> Result<JobAnalysis, AnalysisError> {
        debug!(
            "[职位 id#{}] 模拟分析: 收到 {} 字符的职位描述",
            job_id,
            text.chars().count()
        );
        sleep(self.delay).await;
        Ok(Self::canned_report())
    }
}

/// HTTP 分析客户端
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnalysisSink for HttpAnalysisClient {
    async fn analyze(&self, job_id: &str, text: &str) -> Result<JobAnalysis, AnalysisError> {
        let endpoint = self.endpoint();

        let response = self
            .client
            .post(&endpoint)
            .json(&json!({ "jobId": job_id, "text": text }))
            .send()
            .await
            .map_err(|e| AnalysisError::RequestFailed {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok();
            return Err(AnalysisError::BadResponse {
                endpoint,
                status: Some(status.as_u16()),
                message,
            });
        }

        response
            .json::<JobAnalysis>()
            .await
            .map_err(|e| AnalysisError::ParseFailed(e.to_string()))
    }
}
