pub mod analysis;
pub mod batch;
pub mod job;
pub mod progress;

pub use analysis::{JobAnalysis, MatchAnalysis};
pub use batch::BatchState;
pub use job::{JobRecord, JobStatus};
pub use progress::{ControlSignal, ProgressEvent, ScanStatus};
