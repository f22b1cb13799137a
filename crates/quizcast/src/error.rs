use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Progress store error: {0}")]
    Store(#[from] StoreError),

    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Job not found: {0}")]
    JobNotFound(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Quiz records directory not found: {path}")]
    Unavailable { path: PathBuf },

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read quiz record '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse quiz record '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Quiz record '{path}' does not match schema: {errors}")]
    Schema { path: PathBuf, errors: String },

    #[error("Invalid quiz record '{path}': {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read progress file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Progress file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write progress file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Asset bundle not found: {0}")]
    BundleMissing(PathBuf),

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory '{path}': {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove staged file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid narration pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{message}")]
    Spawn { message: String },

    #[error("Process exited with code {code}")]
    Exit { code: i32 },

    #[error("Process terminated by signal {signal}")]
    Signal { signal: i32 },

    #[error("Process exited without an exit code")]
    NoExitCode,

    #[error("Failed to write render props '{path}': {source}")]
    Props {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize render props: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed waiting for compositor: {0}")]
    Wait(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuizcastError>;
