//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（Page），只暴露能力，不含业务语义

pub mod js_executor;
pub mod polling;

pub use js_executor::JsExecutor;
pub use polling::wait_until;
