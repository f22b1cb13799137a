use std::sync::Arc;

use futures_util::future::join_all;
use log::info;
use rand::seq::SliceRandom;

use crate::catalog::{Job, WorkCatalog};
use crate::config::{BatchConfig, Config};
use crate::error::{QuizcastError, Result};
use crate::pipeline::{JobReport, JobRunner};
use crate::progress::ProgressStore;
use crate::render::{Compositor, ProcessCompositor};
use crate::storage::AssetStager;

use super::progress::{BatchEvent, BatchProgress, BatchTally};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Confirmation was declined; nothing ran.
    Cancelled { pending: usize },
    Completed(BatchTally),
}

/// Decides which jobs run and sequences them through the [`JobRunner`].
pub struct BatchScheduler {
    catalog: WorkCatalog,
    store: Arc<ProgressStore>,
    stager: Arc<AssetStager>,
    runner: JobRunner,
    single_concurrency: usize,
    batch: BatchConfig,
}

impl BatchScheduler {
    /// Production constructor: renders through the configured compositor process.
    pub fn from_config(config: &Config) -> Self {
        let paths = config.resolved_paths();
        let compositor = Arc::new(ProcessCompositor::new(
            config.compositor.clone(),
            &paths.compositor_dir,
        ));
        Self::with_compositor(config, compositor)
    }

    pub fn with_compositor(config: &Config, compositor: Arc<dyn Compositor>) -> Self {
        let paths = config.resolved_paths();
        let store = Arc::new(ProgressStore::new(&paths.progress_file));
        let stager = Arc::new(AssetStager::from_paths(&paths, config.staging.clone()));
        let runner = JobRunner::new(Arc::clone(&store), Arc::clone(&stager), compositor);

        Self {
            catalog: WorkCatalog::from_paths(&paths),
            store,
            stager,
            runner,
            single_concurrency: config.compositor.concurrency,
            batch: config.batch.clone(),
        }
    }

    pub fn catalog(&self) -> &WorkCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn stager(&self) -> &AssetStager {
        &self.stager
    }

    pub fn unfinished(&self) -> Result<Vec<Job>> {
        Ok(self.catalog.unfinished_jobs(&self.store)?)
    }

    /// Runs one unfinished job picked at random. `None` when everything is done.
    pub async fn run_one(&self) -> Result<Option<JobReport>> {
        let unfinished = self.unfinished()?;
        let Some(job) = unfinished.choose(&mut rand::thread_rng()).cloned() else {
            info!("All jobs are completed");
            return Ok(None);
        };

        info!(
            "Picked '{}' from {} unfinished jobs",
            job.id,
            unfinished.len()
        );
        Ok(Some(self.runner.run(&job, self.single_concurrency).await))
    }

    /// Runs the named job regardless of its current status.
    pub async fn run_job(&self, identity: &str) -> Result<JobReport> {
        let job = self
            .catalog
            .find_job(identity)?
            .ok_or_else(|| QuizcastError::JobNotFound(identity.to_string()))?;

        Ok(self.runner.run(&job, self.single_concurrency).await)
    }

    /// Runs every unfinished job in groups of `batch.group_size`.
    ///
    /// `confirm` receives the number of pending jobs and must return `true`
    /// for anything to run. Failed jobs are not retried within the batch.
    pub async fn run_batch<F>(&self, confirm: F, progress: &dyn BatchProgress) -> Result<BatchOutcome>
    where
        F: FnOnce(usize) -> bool,
    {
        let jobs = self.unfinished()?;
        if jobs.is_empty() {
            info!("No unfinished jobs");
            return Ok(BatchOutcome::Completed(BatchTally::default()));
        }

        if !confirm(jobs.len()) {
            info!("Batch of {} jobs cancelled", jobs.len());
            return Ok(BatchOutcome::Cancelled {
                pending: jobs.len(),
            });
        }

        let group_size = self.batch.group_size.max(1);
        let groups = jobs.len().div_ceil(group_size);
        let concurrency = self.batch.concurrency_per_render;
        let mut tally = BatchTally::new(jobs.len());

        progress.report(BatchEvent::Started {
            total: jobs.len(),
            groups,
        });

        for (index, group) in jobs.chunks(group_size).enumerate() {
            progress.report(BatchEvent::GroupStarted {
                index,
                groups,
                jobs: group,
            });

            let reports = join_all(group.iter().map(|job| self.runner.run(job, concurrency))).await;
            for report in reports {
                progress.report(BatchEvent::JobFinished { report: &report });
                tally.record(report);
            }

            progress.report(BatchEvent::GroupFinished {
                index,
                groups,
                tally: &tally,
            });
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            tally.succeeded, tally.failed
        );
        Ok(BatchOutcome::Completed(tally))
    }

    /// Crash recovery: every `in_progress` entry goes back to pending.
    pub fn reset_stuck(&self) -> Result<Vec<String>> {
        Ok(self.store.reset_stuck()?)
    }
}
