//! # Job Batch Scan
//!
//! 一个批量抓取职位并递交分析的 Rust 应用程序
//!
//! 连接（或启动）浏览器，在职位列表页上逐个激活职位卡片、等待详情
//! 面板确认、抽取职位描述并递交分析服务。扫描可暂停/恢复/停止，
//! 进度落盘，进程重启后可以从快照继续
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `polling` - "等谓词变真或超时"的有界轮询原语
//!
//! ### ② 端口层（Ports）
//! - `ports/` - 编排器对外部协作者的抽象依赖
//! - `JobInteractor` - 激活 / 确认 / 抽取能力
//! - `StateStore` - 快照持久化能力
//! - `ProgressReporter` - 进度外发能力
//! - `AnalysisSink` - 分析递交能力
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 端口的具体适配器
//! - `PageInteractor` - 注入脚本驱动页面
//! - `JsonSnapshotStore` - JSON 快照文件
//! - `ProgressChannel` - 带就绪握手的进度通道
//! - `MockAnalysisClient` / `HttpAnalysisClient` - 分析递交
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个职位"的完整处理流程
//! - `JobCtx` - 上下文封装（队列序号 + 职位 id）
//! - `JobFlow` - 流程编排（激活 → 确认 → 抽取 → 递交）
//! - `RetryPolicy` - 失败重试决策
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_scanner` - 批量扫描状态机，管理队列和控制信号
//! - `orchestrator/app` - 应用装配，管理浏览器资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod ports;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{BatchState, JobRecord, JobStatus, ProgressEvent, ScanStatus};
pub use orchestrator::{App, BatchScanner, ScanController};
pub use workflow::{JobCtx, JobFlow, JobOutcome, RetryPolicy};
