//! 页面交互适配器 - 业务能力层
//!
//! 用注入脚本实现 `JobInteractor` 端口：定位职位卡片、模拟点击、
//! 轮询详情面板确认、抽取职位描述。页面结构相关的选择器全部收敛在
//! 这个文件里，编排器完全不感知
//!
//! 点击策略：优先原生 click()，失败时退回派发 MouseEvent；
//! 两种策略都无法确认派发成功时如实上报激活失败，不伪装成成功

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::infrastructure::{polling::wait_until, JsExecutor};
use crate::ports::{JobInteractor, ScanError};

/// 激活脚本的探测结果
#[derive(Debug, Deserialize)]
struct ActivateProbe {
    found: bool,
    clicked: bool,
}

/// 页面交互适配器
pub struct PageInteractor {
    executor: JsExecutor,
    poll_interval: Duration,
}

impl PageInteractor {
    pub fn new(executor: JsExecutor, poll_interval: Duration) -> Self {
        Self {
            executor,
            poll_interval,
        }
    }

    /// 扫描列表页，按出现顺序枚举职位卡片 id（去重）
    pub async fn enumerate_job_ids(&self) -> Result<Vec<String>> {
        let js_code = r#"
            Array.from(document.querySelectorAll('li[data-occludable-job-id]'))
                .map((el) => el.getAttribute('data-occludable-job-id'))
                .filter((id) => !!id)
        "#;

        let raw: Vec<String> = self.executor.eval_as(js_code).await?;

        let mut ids = Vec::with_capacity(raw.len());
        for id in raw {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        debug!("列表页枚举到 {} 个职位卡片", ids.len());
        Ok(ids)
    }

    /// 详情面板是否已经切换到目标职位
    async fn confirmation_probe(&self, id: &str) -> bool {
        let quoted = match serde_json::to_string(id) {
            Ok(q) => q,
            Err(_) => return false,
        };

        let js_code = format!(
            r#"
            (() => {{
                const id = {};
                const detail = document.querySelector('.jobs-search__job-details--container')
                    || document.querySelector('.jobs-unified-top-card');
                if (!detail) {{ return false; }}
                const marker = detail.querySelector('[data-job-id]');
                if (marker && marker.getAttribute('data-job-id') === id) {{ return true; }}
                const link = detail.querySelector('a[href*="/jobs/view/"]');
                return !!(link && link.href.indexOf(id) !== -1);
            }})()
            "#,
            quoted
        );

        self.executor.probe(js_code).await
    }

    fn quote(id: &str) -> Result<String, ScanError> {
        serde_json::to_string(id).map_err(|e| ScanError::Internal(e.to_string()))
    }
}

#[async_trait]
impl JobInteractor for PageInteractor {
    async fn activate(&self, id: &str) -> Result<(), ScanError> {
        let js_code = format!(
            r#"
            (() => {{
                const id = {};
                const card = document.querySelector('li[data-occludable-job-id="' + id + '"]');
                if (!card) {{ return {{ found: false, clicked: false }}; }}

                const link = card.querySelector('a.job-card-list__title') || card.querySelector('a');
                const target = link || card;
                try {{ target.scrollIntoView({{ block: 'center' }}); }} catch (e) {{}}

                let clicked = false;
                if (typeof target.click === 'function') {{
                    target.click();
                    clicked = true;
                }}
                if (!clicked) {{
                    const ev = new MouseEvent('click', {{ bubbles: true, cancelable: true, view: window }});
                    clicked = target.dispatchEvent(ev);
                }}
                return {{ found: true, clicked: clicked }};
            }})()
            "#,
            Self::quote(id)?
        );

        let probe: ActivateProbe = self
            .executor
            .eval_as(js_code)
            .await
            .map_err(|e| ScanError::Internal(e.to_string()))?;

        if !probe.found {
            return Err(ScanError::NotFound { id: id.to_string() });
        }
        if !probe.clicked {
            warn!("[职位 id#{}] 卡片存在但点击未派发成功", id);
            return Err(ScanError::ActivationFailed { id: id.to_string() });
        }
        Ok(())
    }

    async fn await_confirmation(&self, id: &str, timeout: Duration) -> Result<(), ScanError> {
        let confirmed =
            wait_until(self.poll_interval, timeout, || self.confirmation_probe(id)).await;

        if confirmed {
            Ok(())
        } else {
            Err(ScanError::ConfirmationTimeout {
                id: id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn extract(&self) -> Result<String, ScanError> {
        let js_code = r#"
            (() => {
                const el = document.querySelector('.jobs-description-content__text')
                    || document.querySelector('.jobs-description__container');
                return el ? el.innerText : '';
            })()
        "#;

        self.executor
            .eval_as(js_code)
            .await
            .map_err(|e| ScanError::Internal(e.to_string()))
    }
}
