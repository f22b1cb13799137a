use std::path::{Path, PathBuf};

use crate::sanitize;

const RECORD_EXTENSION: &str = ".json";

/// One unit of work: a quiz record, its narration bundle and the video it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Stable identity, the record's file name without `.json`.
    pub id: String,
    pub record_path: PathBuf,
    /// Name of the narration bundle directory. Same as `id`.
    pub bundle_name: String,
    pub output_path: PathBuf,
}

impl Job {
    /// Builds a job for a record file, or `None` if the path is not a `.json` record.
    pub fn from_record_path(record_path: &Path, output_dir: &Path) -> Option<Self> {
        let file_name = record_path.file_name()?.to_str()?;
        let id = file_name.strip_suffix(RECORD_EXTENSION)?;
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            record_path: record_path.to_path_buf(),
            bundle_name: id.to_string(),
            output_path: output_dir.join(sanitize::video_file_name(id)),
        })
    }
}
