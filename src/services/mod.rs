pub mod analysis_client;
pub mod page_interactor;
pub mod progress_channel;
pub mod snapshot_store;

pub use analysis_client::{HttpAnalysisClient, MockAnalysisClient};
pub use page_interactor::PageInteractor;
pub use progress_channel::ProgressChannel;
pub use snapshot_store::JsonSnapshotStore;
