pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod report;
pub mod sanitize;
pub mod storage;
pub mod templates;
pub mod timeline;
pub mod worker;

pub use catalog::{Job, QuizItem, QuizRecord, WorkCatalog};
pub use config::{discover_config, load_config, Config};
pub use error::{
    CatalogError, ConfigError, QuizcastError, RecordError, RenderError, Result, StagingError,
    StoreError,
};
pub use pipeline::{JobReport, JobRunner};
pub use progress::{ProgressEntry, ProgressStatus, ProgressStore, ProgressUpdate};
pub use render::{Compositor, ProcessCompositor, RenderRequest};
pub use report::{ProgressSummary, SystemReport};
pub use storage::AssetStager;
pub use templates::{seeded_template, TemplateInfo, TEMPLATES};
pub use timeline::{total_frames, TimelinePlan};
pub use worker::{BatchOutcome, BatchProgress, BatchScheduler, BatchTally};
