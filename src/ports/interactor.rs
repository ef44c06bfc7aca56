//! 页面交互端口
//!
//! 编排器对"激活职位卡片 → 确认详情切换 → 抽取文本"这组动作的
//! 抽象依赖。适配器内部怎么定位元素、怎么轮询确认，编排器不关心，
//! 它只要求每一步有界返回

use std::time::Duration;

use async_trait::async_trait;

/// 单次交互步骤的失败分类，四类全部可按重试策略重试
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    /// 按 id 找不到职位卡片
    #[error("未找到职位卡片: {id}")]
    NotFound { id: String },

    /// 卡片找到了，但点击动作没有派发成功
    #[error("职位卡片激活失败: {id}")]
    ActivationFailed { id: String },

    /// 详情面板在超时窗口内始终没有切换到目标职位
    #[error("等待详情确认超时 ({timeout_ms} ms): {id}")]
    ConfirmationTimeout { id: String, timeout_ms: u64 },

    /// 详情确认了，但抽取到的文本为空
    #[error("职位描述为空: {id}")]
    ExtractionEmpty { id: String },

    /// 适配器内部错误（脚本执行失败等），同样按可重试处理
    #[error("页面交互内部错误: {0}")]
    Internal(String),
}

/// 页面交互能力
///
/// 每一步都必须有界返回，不允许无限阻塞；
/// 激活失败必须如实上报，不得把"没点到"伪装成成功
#[async_trait]
pub trait JobInteractor: Send + Sync {
    /// 定位职位卡片并触发打开动作
    async fn activate(&self, id: &str) -> Result<(), ScanError>;

    /// 协作式等待，直到详情面板确认切换到该职位或超时
    async fn await_confirmation(&self, id: &str, timeout: Duration) -> Result<(), ScanError>;

    /// 抽取当前详情面板的职位描述文本（可能为空串）
    async fn extract(&self) -> Result<String, ScanError>;
}
