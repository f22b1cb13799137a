//! Progress summary and system check.

use std::path::Path;

use glob::Pattern;
use log::warn;
use serde::Serialize;
use walkdir::WalkDir;

use crate::catalog::WorkCatalog;
use crate::config::{Config, ResolvedPaths};
use crate::error::CatalogError;
use crate::progress::{ProgressStatus, ProgressStore};
use crate::templates::{TemplateInfo, TEMPLATES};

const SAMPLE_SIZE: usize = 5;

/// Job counts by status over the current catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl ProgressSummary {
    /// Entries for records no longer in the catalog are not counted.
    pub fn compute(catalog: &WorkCatalog, store: &ProgressStore) -> Result<Self, CatalogError> {
        let jobs = catalog.list_jobs()?;
        let progress = store.load();

        let mut summary = Self {
            total: jobs.len(),
            ..Default::default()
        };
        for job in &jobs {
            match progress.get(&job.id).map(|entry| entry.status) {
                Some(ProgressStatus::Completed) => summary.completed += 1,
                Some(ProgressStatus::Failed) => summary.failed += 1,
                Some(ProgressStatus::InProgress) => summary.in_progress += 1,
                Some(ProgressStatus::Pending) | None => summary.pending += 1,
            }
        }
        Ok(summary)
    }

    pub fn unfinished(&self) -> usize {
        self.total - self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordsOverview {
    pub count: usize,
    pub sample: Vec<String>,
}

/// Environment check. `None` marks a part that could not be inspected.
#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub templates: Vec<TemplateInfo>,
    pub records: Option<RecordsOverview>,
    pub bundles: Option<usize>,
    pub summary: Option<ProgressSummary>,
    pub rendered_videos: Option<usize>,
}

impl SystemReport {
    pub fn collect(config: &Config) -> Self {
        let paths = config.resolved_paths();
        Self::collect_paths(&paths)
    }

    pub fn collect_paths(paths: &ResolvedPaths) -> Self {
        let catalog = WorkCatalog::from_paths(paths);
        let store = ProgressStore::new(&paths.progress_file);

        let records = match catalog.list_jobs() {
            Ok(jobs) => Some(RecordsOverview {
                count: jobs.len(),
                sample: jobs.iter().take(SAMPLE_SIZE).map(|job| job.id.clone()).collect(),
            }),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        let summary = ProgressSummary::compute(&catalog, &store).ok();

        Self {
            templates: TEMPLATES.to_vec(),
            records,
            bundles: count_bundles(&paths.bundles_dir),
            summary,
            rendered_videos: count_videos(&paths.output_dir),
        }
    }
}

fn count_bundles(bundles_dir: &Path) -> Option<usize> {
    if !bundles_dir.is_dir() {
        warn!("Asset bundle directory not found: {}", bundles_dir.display());
        return None;
    }

    let count = WalkDir::new(bundles_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .count();
    Some(count)
}

fn count_videos(output_dir: &Path) -> Option<usize> {
    if !output_dir.is_dir() {
        return None;
    }

    let pattern = format!(
        "{}/*.mp4",
        Pattern::escape(&output_dir.to_string_lossy())
    );
    match glob::glob(&pattern) {
        Ok(paths) => Some(paths.filter_map(|p| p.ok()).count()),
        Err(e) => {
            warn!("Invalid video pattern '{}': {}", pattern, e);
            None
        }
    }
}
