use log::info;

use crate::catalog::Job;
use crate::pipeline::JobReport;

/// Running totals for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reports: Vec<JobReport>,
}

impl BatchTally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn record(&mut self, report: JobReport) {
        if report.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.reports.push(report);
    }
}

/// Events emitted while a batch runs.
pub enum BatchEvent<'a> {
    Started {
        total: usize,
        groups: usize,
    },
    GroupStarted {
        index: usize,
        groups: usize,
        jobs: &'a [Job],
    },
    JobFinished {
        report: &'a JobReport,
    },
    GroupFinished {
        index: usize,
        groups: usize,
        tally: &'a BatchTally,
    },
}

pub trait BatchProgress: Send + Sync {
    fn report(&self, event: BatchEvent<'_>);
}

/// No-op observer for tests and callers that only want the final tally.
pub struct NoopBatchProgress;

impl BatchProgress for NoopBatchProgress {
    fn report(&self, _event: BatchEvent<'_>) {}
}

/// Writes batch progress to the log.
pub struct LogBatchProgress;

impl BatchProgress for LogBatchProgress {
    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started { total, groups } => {
                info!("Rendering {} jobs in {} groups", total, groups);
            }
            BatchEvent::GroupStarted {
                index,
                groups,
                jobs,
            } => {
                let names: Vec<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
                info!("Group {}/{}: {}", index + 1, groups, names.join(", "));
            }
            BatchEvent::JobFinished { report } => {
                if let Some(error) = &report.error {
                    info!("'{}' failed: {}", report.job_id, error);
                } else {
                    info!("'{}' done", report.job_id);
                }
            }
            BatchEvent::GroupFinished { tally, .. } => {
                info!(
                    "Progress: {}/{} ({} succeeded, {} failed)",
                    tally.processed(),
                    tally.total,
                    tally.succeeded,
                    tally.failed
                );
            }
        }
    }
}
