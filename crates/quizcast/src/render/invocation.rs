use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::QuizRecord;
use crate::config::CompositorConfig;
use crate::render::RenderRequest;

/// Payload handed to the composition through `--props`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProps<'a> {
    pub quiz_data: &'a QuizRecord,
    pub audio_folder: &'a str,
    pub template_id: &'a str,
    pub duration_in_frames: u64,
    pub fps: u32,
}

impl<'a> RenderProps<'a> {
    pub fn from_request(request: &RenderRequest<'a>) -> Self {
        Self {
            quiz_data: request.record,
            audio_folder: &request.job.bundle_name,
            template_id: request.template.id,
            duration_in_frames: request.plan.total_frames,
            fps: request.plan.fps,
        }
    }
}

/// Fully resolved compositor command line. Arguments are never joined into a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
    pub props_path: PathBuf,
}

/// Unique per render so jobs sharing a working directory never clash.
pub fn props_file_name() -> String {
    format!(".render-props-{}.json", Uuid::new_v4())
}

impl RenderInvocation {
    /// `display` is the inherited `DISPLAY`, if any.
    pub fn build(
        config: &CompositorConfig,
        working_dir: &Path,
        request: &RenderRequest<'_>,
        props_path: PathBuf,
        display: Option<String>,
    ) -> Self {
        let mut args = config.base_args.clone();
        args.push(config.composition.clone());
        args.push(request.job.output_path.to_string_lossy().into_owned());
        args.push("--props".to_string());
        args.push(props_path.to_string_lossy().into_owned());
        args.extend([
            "--concurrency".to_string(),
            request.concurrency.to_string(),
            "--height".to_string(),
            config.height.to_string(),
            "--crf".to_string(),
            config.crf.to_string(),
            "--image-format".to_string(),
            config.image_format.clone(),
            "--codec".to_string(),
            config.codec.clone(),
            "--overwrite".to_string(),
            "--gl".to_string(),
            config.gl.clone(),
            "--timeout".to_string(),
            config.timeout_ms.to_string(),
        ]);
        args.extend(
            config
                .chromium_flags
                .iter()
                .map(|flag| format!("--chromium-flags={}", flag)),
        );

        let display = display
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| config.display.clone());

        let env = vec![
            ("DISPLAY".to_string(), display),
            ("CHROMIUM_FLAGS".to_string(), config.chromium_flags.join(" ")),
            (
                "PUPPETEER_SKIP_CHROMIUM_DOWNLOAD".to_string(),
                "false".to_string(),
            ),
        ];

        Self {
            program: config.program.clone(),
            args,
            working_dir: working_dir.to_path_buf(),
            env,
            props_path,
        }
    }
}
