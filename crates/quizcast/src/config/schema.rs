use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub compositor: CompositorConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    /// Directory of the file this config was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            paths: PathsConfig::default(),
            staging: StagingConfig::default(),
            compositor: CompositorConfig::default(),
            batch: BatchConfig::default(),
            base_dir: None,
        }
    }
}

impl Config {
    /// Root every relative path is resolved against.
    pub fn project_root(&self) -> PathBuf {
        let root = PathBuf::from(&self.paths.project_root);
        if root.is_absolute() {
            return root;
        }
        let base = self
            .base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(root)
    }

    pub fn resolved_paths(&self) -> ResolvedPaths {
        let root = self.project_root();
        let resolve = |p: &str| -> PathBuf {
            let path = Path::new(p);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };

        ResolvedPaths {
            records_dir: resolve(&self.paths.records_dir),
            bundles_dir: resolve(&self.paths.bundles_dir),
            output_dir: resolve(&self.paths.output_dir),
            progress_file: resolve(&self.paths.progress_file),
            staging_dir: resolve(&self.paths.staging_dir),
            compositor_dir: resolve(&self.compositor.working_dir),
            project_root: root,
        }
    }
}

/// Filesystem layout, as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_project_root")]
    pub project_root: String,
    #[serde(default = "default_records_dir")]
    pub records_dir: String,
    #[serde(default = "default_bundles_dir")]
    pub bundles_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_progress_file")]
    pub progress_file: String,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_records_dir() -> String {
    "videogen/quiz jsons".to_string()
}

fn default_bundles_dir() -> String {
    "audiogen/output audios".to_string()
}

fn default_output_dir() -> String {
    "videogen/output/videos".to_string()
}

fn default_progress_file() -> String {
    "videogen/output/progress.json".to_string()
}

fn default_staging_dir() -> String {
    "videogen/public/question_audios".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            records_dir: default_records_dir(),
            bundles_dir: default_bundles_dir(),
            output_dir: default_output_dir(),
            progress_file: default_progress_file(),
            staging_dir: default_staging_dir(),
        }
    }
}

/// Absolute paths derived from [`PathsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub project_root: PathBuf,
    pub records_dir: PathBuf,
    pub bundles_dir: PathBuf,
    pub output_dir: PathBuf,
    pub progress_file: PathBuf,
    pub staging_dir: PathBuf,
    pub compositor_dir: PathBuf,
}

/// Naming convention for narration files (`<prefix>*.<extension>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_prefix() -> String {
    "question_".to_string()
}

fn default_extension() -> String {
    "mp3".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            extension: default_extension(),
        }
    }
}

impl StagingConfig {
    /// Prefix and extension match literally; only the middle is a wildcard.
    pub fn glob_pattern(&self) -> String {
        format!(
            "{}*.{}",
            glob::Pattern::escape(&self.prefix),
            glob::Pattern::escape(&self.extension)
        )
    }

    pub fn file_name_for(&self, item_id: u64) -> String {
        format!("{}{}.{}", self.prefix, item_id, self.extension)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_base_args")]
    pub base_args: Vec<String>,
    #[serde(default = "default_composition")]
    pub composition: String,
    /// Rendering project root, relative to `paths.project_root`.
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_image_format")]
    pub image_format: String,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    /// Handed to the compositor; the driver does not enforce it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Concurrency hint for single renders.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Used when `DISPLAY` is not set in the environment.
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default = "default_chromium_flags")]
    pub chromium_flags: Vec<String>,
}

fn default_program() -> String {
    "npx".to_string()
}

fn default_base_args() -> Vec<String> {
    vec!["remotion".to_string(), "render".to_string()]
}

fn default_composition() -> String {
    "QuizVideo".to_string()
}

fn default_working_dir() -> String {
    "videogen".to_string()
}

fn default_height() -> u32 {
    1080
}

fn default_crf() -> u32 {
    18
}

fn default_image_format() -> String {
    "png".to_string()
}

fn default_codec() -> String {
    "h264".to_string()
}

fn default_gl() -> String {
    "angle".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_concurrency() -> usize {
    4
}

fn default_display() -> String {
    ":99".to_string()
}

fn default_chromium_flags() -> Vec<String> {
    [
        "--enable-gpu",
        "--use-gl=angle",
        "--use-angle=gl",
        "--enable-gpu-rasterization",
        "--enable-zero-copy",
        "--ignore-gpu-blocklist",
        "--enable-hardware-overlays",
        "--disable-software-rasterizer",
        "--disable-dev-shm-usage",
        "--no-sandbox",
        "--autoplay-policy=no-user-gesture-required",
        "--disable-features=AudioServiceOutOfProcess",
        "--disable-audio-output",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            base_args: default_base_args(),
            composition: default_composition(),
            working_dir: default_working_dir(),
            height: default_height(),
            crf: default_crf(),
            image_format: default_image_format(),
            codec: default_codec(),
            gl: default_gl(),
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            display: default_display(),
            chromium_flags: default_chromium_flags(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Jobs started together per group. One keeps renders strictly sequential.
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    /// Concurrency hint for each render during a batch.
    #[serde(default = "default_concurrency_per_render")]
    pub concurrency_per_render: usize,
}

fn default_group_size() -> usize {
    1
}

fn default_concurrency_per_render() -> usize {
    num_cpus::get().clamp(1, 8)
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            concurrency_per_render: default_concurrency_per_render(),
        }
    }
}
