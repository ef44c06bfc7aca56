//! 进度通道 - 业务能力层
//!
//! 显示层（侧边栏等）通过这里接收进度事件。通道只有一条出站路径：
//! 显示层调用 `attach()` 完成就绪握手之前，事件进入有界缓冲，
//! 超出容量时丢弃最旧的一条；握手后先补发缓冲，再实时投递

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::models::ProgressEvent;
use crate::ports::ProgressReporter;

struct ChannelInner {
    ready: bool,
    buffer: VecDeque<ProgressEvent>,
    tx: Option<UnboundedSender<ProgressEvent>>,
    dropped: u64,
}

/// 带就绪握手的进度通道
pub struct ProgressChannel {
    inner: Mutex<ChannelInner>,
    capacity: usize,
}

impl ProgressChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ChannelInner {
                ready: false,
                buffer: VecDeque::new(),
                tx: None,
                dropped: 0,
            }),
            capacity,
        }
    }

    /// 显示层就绪握手：补发缓冲中的事件并切换到实时投递
    pub fn attach(&self) -> UnboundedReceiver<ProgressEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(mut inner) = self.inner.lock() {
            while let Some(event) = inner.buffer.pop_front() {
                let _ = tx.send(event);
            }
            inner.tx = Some(tx);
            inner.ready = true;
            if inner.dropped > 0 {
                debug!("就绪前缓冲溢出，共丢弃 {} 条进度事件", inner.dropped);
            }
        }

        rx
    }

    /// 显示层离开，回到缓冲模式
    pub fn detach(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.ready = false;
            inner.tx = None;
        }
    }
}

#[async_trait]
impl ProgressReporter for ProgressChannel {
    async fn emit(&self, event: ProgressEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        if inner.ready {
            if let Some(tx) = &inner.tx {
                if tx.send(event).is_ok() {
                    return;
                }
            }
            // 接收端已关闭，退回缓冲模式
            inner.ready = false;
            inner.tx = None;
            return;
        }

        inner.buffer.push_back(event);
        if inner.buffer.len() > self.capacity {
            inner.buffer.pop_front();
            inner.dropped += 1;
        }
    }
}
