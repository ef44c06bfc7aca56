//! 分析服务返回的报告结构
//!
//! 字段与分析后端的 JSON 返回一一对应（snake_case）

use serde::{Deserialize, Serialize};

/// 匹配度分析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    /// 0-100 的匹配分
    pub score: u32,
    pub summary: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// 一份职位分析报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub job_title: String,
    pub company: String,
    pub match_analysis: MatchAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_payload() {
        // 后端返回的报文样例
        let raw = r#"{
            "job_title": "Senior Frontend Engineer",
            "company": "Tech Innovations Inc.",
            "match_analysis": {
                "score": 75,
                "summary": "Good fit for frontend skills, but lacks backend experience mentioned in the JD.",
                "pros": ["Strong experience with React and TypeScript."],
                "cons": ["JD mentions Node.js experience, which is not prominent in the CV."]
            }
        }"#;

        let report: JobAnalysis = serde_json::from_str(raw).unwrap();
        assert_eq!(report.match_analysis.score, 75);
        assert_eq!(report.company, "Tech Innovations Inc.");
        assert_eq!(report.match_analysis.pros.len(), 1);
    }
}
