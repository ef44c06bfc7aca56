//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量扫描的调度和生命周期管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_scanner` - 批量扫描编排器
//! - 独占持有运行状态（BatchState）
//! - 逐个驱动任务到终态，游标单调推进
//! - 在任务边界响应控制信号（pause / resume / stop）
//! - 每次状态变更后持久化快照、外发进度事件
//! - 支持从持久化快照恢复
//!
//! ### `app` - 应用装配
//! - 管理应用生命周期（初始化、运行、收尾）
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 枚举列表页构建任务队列
//! - 选择启动路径（恢复 or 全新扫描）
//!
//! ## 层次关系
//!
//! ```text
//! app (装配 + 队列构建)
//!     ↓
//! batch_scanner (处理 Vec<JobRecord>)
//!     ↓
//! workflow::JobFlow (处理单个 JobRecord)
//!     ↓
//! ports (端口：interactor / state_store / progress / analysis)
//!     ↓
//! services (适配器) → infrastructure (JsExecutor / 轮询原语)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_scanner 管队列，JobFlow 管单个任务
//! 2. **资源隔离**：只有装配层持有 Browser
//! 3. **状态独占**：BatchState 只被编排器修改，外部只读快照
//! 4. **单工作者**：同一页面上下文同时只有一次运行，无需加锁

pub mod app;
pub mod batch_scanner;

// 重新导出主要类型
pub use app::App;
pub use batch_scanner::{BatchScanner, ScanController};
