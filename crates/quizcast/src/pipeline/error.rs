use std::path::PathBuf;

use thiserror::Error;

/// Why a job ended up `failed`. The message becomes the entry's `lastError`.
#[derive(Error, Debug)]
pub enum JobFailure {
    #[error("Asset bundle missing")]
    BundleMissing,

    #[error("Asset staging failed")]
    Staging(#[source] crate::error::StagingError),

    #[error("{0}")]
    Record(#[from] crate::error::RecordError),

    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Store(#[from] crate::error::StoreError),

    #[error("{0}")]
    Render(#[from] crate::error::RenderError),

    #[error("Job panicked: {0}")]
    Panic(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobWarning {
    MissingNarration { item_ids: Vec<u64> },
}
