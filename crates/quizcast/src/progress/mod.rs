pub mod entry;
pub mod store;

pub use entry::{ProgressEntry, ProgressMap, ProgressStatus, ProgressUpdate};
pub use store::ProgressStore;
