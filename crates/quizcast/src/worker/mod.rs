pub mod progress;
pub mod scheduler;

pub use progress::{BatchEvent, BatchProgress, BatchTally, LogBatchProgress, NoopBatchProgress};
pub use scheduler::{BatchOutcome, BatchScheduler};
