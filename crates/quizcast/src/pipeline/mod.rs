pub mod context;
pub mod error;
pub mod runner;

pub use context::{JobContext, JobReport};
pub use error::{JobFailure, JobWarning};
pub use runner::JobRunner;
