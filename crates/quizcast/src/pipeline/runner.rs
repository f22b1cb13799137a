use std::any::Any;
use std::error::Error as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::FutureExt;
use log::{error, info, warn};
use tracing::{info_span, Instrument};

use crate::catalog::{read_record, Job, QuizRecord};
use crate::progress::{ProgressStore, ProgressUpdate};
use crate::render::{Compositor, RenderRequest};
use crate::sanitize;
use crate::storage::AssetStager;
use crate::templates::seeded_template;
use crate::timeline::TimelinePlan;

use super::context::{JobContext, JobReport};
use super::error::{JobFailure, JobWarning};

/// Runs one job end to end and records the outcome in the progress store.
pub struct JobRunner {
    store: Arc<ProgressStore>,
    stager: Arc<AssetStager>,
    compositor: Arc<dyn Compositor>,
}

impl JobRunner {
    pub fn new(
        store: Arc<ProgressStore>,
        stager: Arc<AssetStager>,
        compositor: Arc<dyn Compositor>,
    ) -> Self {
        Self {
            store,
            stager,
            compositor,
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Never fails: every error, panics included, ends up as a `failed` entry.
    pub async fn run(&self, job: &Job, concurrency: usize) -> JobReport {
        let span = info_span!("job",
            job_id = %job.id,
            record = %sanitize::redact_path(&job.record_path),
        );
        let mut ctx = JobContext::new(job);

        let outcome = AssertUnwindSafe(self.execute(&mut ctx, concurrency))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        let failure = match outcome {
            Ok(Ok(())) => {
                info!("Rendered '{}'", ctx.job.id);
                return JobReport::success(&ctx);
            }
            Ok(Err(failure)) => failure,
            Err(panic) => JobFailure::Panic(panic_message(panic.as_ref())),
        };

        self.record_failure(&mut ctx, &failure);
        JobReport::failure(&ctx, failure.to_string())
    }

    async fn execute(&self, ctx: &mut JobContext, concurrency: usize) -> Result<(), JobFailure> {
        // Step 1: Preflight
        {
            let _step = info_span!("preflight").entered();
            self.step_preflight(ctx)?;
        }

        // Step 2: Stage. The lease is held until the render returns.
        let lease = self
            .stager
            .acquire()
            .instrument(info_span!("stage"))
            .await;
        {
            let _step = info_span!("stage").entered();
            let staged = lease
                .stage(&ctx.job.bundle_name)
                .map_err(JobFailure::Staging)?;
            ctx.staged = Some(staged);
        }

        // Step 3: Plan
        let (record, plan) = {
            let _step = info_span!("plan").entered();
            self.step_plan(ctx)?
        };

        // Step 4: Execute
        self.step_render(ctx, &record, &plan, concurrency)
            .instrument(info_span!("execute"))
            .await?;

        drop(lease);
        Ok(())
    }

    fn step_preflight(&self, ctx: &JobContext) -> Result<(), JobFailure> {
        if !self.stager.bundle_exists(&ctx.job.bundle_name) {
            warn!(
                "Asset bundle not found: {}",
                sanitize::redact_path(&self.stager.bundle_path(&ctx.job.bundle_name))
            );
            return Err(JobFailure::BundleMissing);
        }
        Ok(())
    }

    fn step_plan(&self, ctx: &mut JobContext) -> Result<(QuizRecord, TimelinePlan), JobFailure> {
        let record = read_record(&ctx.job.record_path)?;
        let template = seeded_template(&ctx.job.id);
        let plan = TimelinePlan::for_items(record.item_count());

        let missing = self
            .stager
            .missing_narration(&ctx.job.bundle_name, &record.item_ids());
        if !missing.is_empty() {
            warn!(
                "'{}' has no narration for questions {:?}",
                ctx.job.id, missing
            );
            ctx.warnings
                .push(JobWarning::MissingNarration { item_ids: missing });
        }

        if let Some(parent) = ctx.job.output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| JobFailure::OutputDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!(
            "'{}': {} questions, template {} ({}), {} frames (~{:.0}s)",
            ctx.job.id,
            record.item_count(),
            template.id,
            template.name,
            plan.total_frames,
            plan.duration_secs()
        );

        ctx.template = Some(template);

        let update = ProgressUpdate::in_progress(template.id, &ctx.output_file);
        let update = ctx.next_update(update);
        self.store.update(&ctx.job.id, update)?;
        Ok((record, plan))
    }

    async fn step_render(
        &self,
        ctx: &mut JobContext,
        record: &QuizRecord,
        plan: &TimelinePlan,
        concurrency: usize,
    ) -> Result<(), JobFailure> {
        let template = seeded_template(&ctx.job.id);
        let request = RenderRequest {
            job: &ctx.job,
            template,
            plan,
            record,
            concurrency,
        };
        self.compositor.render(&request).await?;

        let update = ProgressUpdate::completed(template.id, &ctx.output_file, Utc::now());
        let update = ctx.next_update(update);
        self.store.update(&ctx.job.id, update)?;
        Ok(())
    }

    fn record_failure(&self, ctx: &mut JobContext, failure: &JobFailure) {
        let message = failure.to_string();
        error!("'{}' failed: {}", ctx.job.id, error_chain(failure));

        let update = match ctx.template {
            Some(template) => ProgressUpdate::render_failed(template.id, &ctx.output_file, message),
            None => ProgressUpdate::failed(message),
        };
        let update = ctx.next_update(update);
        if let Err(e) = self.store.update(&ctx.job.id, update) {
            error!("Failed to record failure for '{}': {}", ctx.job.id, e);
        }
    }
}

/// `failure` and its sources joined with `: `. Sources that only repeat the
/// previous message are skipped.
fn error_chain(failure: &JobFailure) -> String {
    let mut parts = vec![failure.to_string()];
    let mut source = failure.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
