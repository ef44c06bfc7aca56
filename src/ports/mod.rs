//! 端口层（Ports）
//!
//! 编排器对外部协作者的全部依赖都收敛在这里：
//!
//! - `JobInteractor` - 页面交互（激活 / 确认 / 抽取）
//! - `StateStore` - 快照持久化（保存 / 读取 / 清除）
//! - `ProgressReporter` - 进度外发
//! - `AnalysisSink` - 分析递交
//!
//! 具体适配器在 `services/` 里；测试用桩实现放在 tests/ 下

pub mod analysis;
pub mod interactor;
pub mod progress;
pub mod state_store;

pub use analysis::{AnalysisError, AnalysisSink};
pub use interactor::{JobInteractor, ScanError};
pub use progress::ProgressReporter;
pub use state_store::{StateStore, StoreError};
