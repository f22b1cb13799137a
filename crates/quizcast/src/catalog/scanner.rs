use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::catalog::job::Job;
use crate::catalog::record::{self, QuizRecord};
use crate::config::ResolvedPaths;
use crate::error::{CatalogError, RecordError};
use crate::progress::{ProgressStatus, ProgressStore};

/// Read-only view of the quiz records waiting to be rendered.
pub struct WorkCatalog {
    records_dir: PathBuf,
    output_dir: PathBuf,
}

impl WorkCatalog {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(records_dir: P, output_dir: Q) -> Self {
        Self {
            records_dir: records_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_paths(paths: &ResolvedPaths) -> Self {
        Self::new(&paths.records_dir, &paths.output_dir)
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// All jobs in the records directory, ordered by identity.
    pub fn list_jobs(&self) -> Result<Vec<Job>, CatalogError> {
        if !self.records_dir.is_dir() {
            return Err(CatalogError::Unavailable {
                path: self.records_dir.clone(),
            });
        }

        let mut jobs = Vec::new();

        for entry in WalkDir::new(&self.records_dir)
            .min_depth(1)
            .max_depth(1) // Records live at the top level only
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CatalogError::ScanFailed {
                path: self.records_dir.clone(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(job) = Job::from_record_path(entry.path(), &self.output_dir) {
                debug!("Found quiz record: {}", job.id);
                jobs.push(job);
            }
        }

        info!(
            "Scanned {} quiz records in {}",
            jobs.len(),
            self.records_dir.display()
        );
        Ok(jobs)
    }

    /// Jobs whose progress entry is anything but `completed`.
    pub fn unfinished_jobs(&self, store: &ProgressStore) -> Result<Vec<Job>, CatalogError> {
        let progress = store.load();
        let jobs = self
            .list_jobs()?
            .into_iter()
            .filter(|job| {
                progress
                    .get(&job.id)
                    .map(|entry| entry.status != ProgressStatus::Completed)
                    .unwrap_or(true)
            })
            .collect();
        Ok(jobs)
    }

    pub fn find_job(&self, identity: &str) -> Result<Option<Job>, CatalogError> {
        Ok(self.list_jobs()?.into_iter().find(|job| job.id == identity))
    }

    pub fn read_record(&self, job: &Job) -> Result<QuizRecord, RecordError> {
        record::read_record(&job.record_path)
    }
}
