pub mod job;
pub mod record;
pub mod scanner;

pub use job::Job;
pub use record::{parse_record, read_record, QuizItem, QuizRecord};
pub use scanner::WorkCatalog;
