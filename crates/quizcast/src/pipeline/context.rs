use std::path::PathBuf;

use crate::catalog::Job;
use crate::progress::ProgressUpdate;
use crate::storage::StagedAssets;
use crate::templates::TemplateInfo;

use super::error::JobWarning;

/// State accumulated while one job runs.
pub struct JobContext {
    // Input
    pub job: Job,
    /// `job.output_path` as written to the progress entry.
    pub output_file: String,

    // Stage result
    pub staged: Option<StagedAssets>,

    // Plan result, Some once the entry is marked in_progress
    pub template: Option<&'static TemplateInfo>,

    // Non-fatal warnings
    pub warnings: Vec<JobWarning>,

    attempt_recorded: bool,
}

impl JobContext {
    pub fn new(job: &Job) -> Self {
        Self {
            job: job.clone(),
            output_file: job.output_path.to_string_lossy().into_owned(),
            staged: None,
            template: None,
            warnings: Vec::new(),
            attempt_recorded: false,
        }
    }

    /// Marks the first store write of this run as a new attempt.
    pub fn next_update(&mut self, update: ProgressUpdate) -> ProgressUpdate {
        if self.attempt_recorded {
            update
        } else {
            self.attempt_recorded = true;
            update.starting_attempt()
        }
    }
}

/// Outcome of one job run, for tallying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job_id: String,
    pub output_path: PathBuf,
    pub success: bool,
    pub template_id: Option<String>,
    pub error: Option<String>,
}

impl JobReport {
    pub fn success(ctx: &JobContext) -> Self {
        Self {
            job_id: ctx.job.id.clone(),
            output_path: ctx.job.output_path.clone(),
            success: true,
            template_id: ctx.template.map(|t| t.id.to_string()),
            error: None,
        }
    }

    pub fn failure(ctx: &JobContext, error: String) -> Self {
        Self {
            job_id: ctx.job.id.clone(),
            output_path: ctx.job.output_path.clone(),
            success: false,
            template_id: ctx.template.map(|t| t.id.to_string()),
            error: Some(error),
        }
    }
}
