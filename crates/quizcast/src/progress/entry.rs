use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted map of job identity to its entry, ordered by identity.
pub type ProgressMap = BTreeMap<String, ProgressEntry>;

/// Render status of a job. A job with no entry is `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Pending => write!(f, "pending"),
            ProgressStatus::InProgress => write!(f, "in_progress"),
            ProgressStatus::Completed => write!(f, "completed"),
            ProgressStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Persisted status record for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub status: ProgressStatus,
    /// Template assigned on the last run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Time of the last successful render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default)]
    pub attempts: u32,
}

impl Default for ProgressEntry {
    /// The entry an update starts from when a job has none yet.
    fn default() -> Self {
        Self {
            status: ProgressStatus::InProgress,
            template_id: None,
            output_file: None,
            rendered_at: None,
            last_error: None,
            attempts: 0,
        }
    }
}

impl ProgressEntry {
    /// Merges the fields set in `update` into this entry.
    pub fn apply(&mut self, update: ProgressUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.template_id.is_some() {
            self.template_id = update.template_id;
        }
        if update.output_file.is_some() {
            self.output_file = update.output_file;
        }
        if update.rendered_at.is_some() {
            self.rendered_at = update.rendered_at;
        }
        if update.last_error.is_some() {
            self.last_error = update.last_error;
        }
        if update.new_attempt {
            self.attempts = self.attempts.saturating_add(1);
        }
    }

    /// Reverts a stuck entry to pending. Attempt history and the last error are kept.
    pub fn reset_to_pending(&mut self) {
        self.status = ProgressStatus::Pending;
        self.template_id = None;
        self.output_file = None;
    }
}

/// Partial entry: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    pub status: Option<ProgressStatus>,
    pub template_id: Option<String>,
    pub output_file: Option<String>,
    pub rendered_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Counts this write as the start of a new attempt.
    pub new_attempt: bool,
}

impl ProgressUpdate {
    pub fn status(status: ProgressStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(ProgressStatus::Failed),
            last_error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn in_progress(template_id: &str, output_file: &str) -> Self {
        Self {
            status: Some(ProgressStatus::InProgress),
            template_id: Some(template_id.to_string()),
            output_file: Some(output_file.to_string()),
            ..Default::default()
        }
    }

    pub fn completed(template_id: &str, output_file: &str, rendered_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(ProgressStatus::Completed),
            template_id: Some(template_id.to_string()),
            output_file: Some(output_file.to_string()),
            rendered_at: Some(rendered_at),
            ..Default::default()
        }
    }

    pub fn render_failed(template_id: &str, output_file: &str, error: impl Into<String>) -> Self {
        Self {
            status: Some(ProgressStatus::Failed),
            template_id: Some(template_id.to_string()),
            output_file: Some(output_file.to_string()),
            last_error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn starting_attempt(mut self) -> Self {
        self.new_attempt = true;
        self
    }
}
