use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use log::{info, warn};
use tokio::process::Command;

use crate::config::CompositorConfig;
use crate::error::RenderError;
use crate::render::invocation::{props_file_name, RenderInvocation, RenderProps};
use crate::render::{Compositor, RenderRequest};
use crate::sanitize::redact_path;

/// RAII guard for the props file.
///
/// Deletes the file when dropped, whether the render succeeded or not.
#[derive(Debug)]
pub struct PropsFile {
    path: Option<PathBuf>,
}

impl PropsFile {
    pub fn write(path: PathBuf, props: &RenderProps<'_>) -> Result<Self, RenderError> {
        let json = serde_json::to_string_pretty(props)?;
        std::fs::write(&path, json).map_err(|e| RenderError::Props {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for PropsFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to clean up render props: {}", e);
            }
        }
    }
}

/// Runs the compositor as a child process with inherited output.
pub struct ProcessCompositor {
    config: CompositorConfig,
    working_dir: PathBuf,
}

impl ProcessCompositor {
    pub fn new<P: AsRef<Path>>(config: CompositorConfig, working_dir: P) -> Self {
        Self {
            config,
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn invocation(&self, request: &RenderRequest<'_>) -> RenderInvocation {
        RenderInvocation::build(
            &self.config,
            &self.working_dir,
            request,
            self.working_dir.join(props_file_name()),
            std::env::var("DISPLAY").ok(),
        )
    }
}

#[async_trait]
impl Compositor for ProcessCompositor {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        let invocation = self.invocation(request);
        let _props = PropsFile::write(
            invocation.props_path.clone(),
            &RenderProps::from_request(request),
        )?;

        info!(
            "Launching {} for '{}' -> {}",
            invocation.program,
            request.job.id,
            redact_path(&request.job.output_path)
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.current_dir(&invocation.working_dir)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| RenderError::Spawn {
            message: e.to_string(),
        })?;

        let status = child.wait().await.map_err(RenderError::Wait)?;
        exit_status_result(status)
    }
}

fn exit_status_result(status: ExitStatus) -> Result<(), RenderError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(RenderError::Exit { code });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(RenderError::Signal { signal });
        }
    }

    warn!("Compositor exited without a code or signal");
    Err(RenderError::NoExitCode)
}
