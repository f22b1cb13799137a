//! Compositor seam: what to render and how the external renderer is driven.

pub mod driver;
pub mod invocation;

use async_trait::async_trait;

use crate::catalog::{Job, QuizRecord};
use crate::error::RenderError;
use crate::templates::TemplateInfo;
use crate::timeline::TimelinePlan;

pub use driver::{ProcessCompositor, PropsFile};
pub use invocation::{props_file_name, RenderInvocation, RenderProps};

/// Everything one render needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub job: &'a Job,
    pub template: &'static TemplateInfo,
    pub plan: &'a TimelinePlan,
    pub record: &'a QuizRecord,
    /// Hint passed through to the compositor.
    pub concurrency: usize,
}

/// Produces the video for one job.
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError>;
}
