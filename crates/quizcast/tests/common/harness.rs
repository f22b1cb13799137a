//! Test harness providing an isolated project layout.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use quizcast::config::ResolvedPaths;
use quizcast::progress::{ProgressEntry, ProgressMap};
use quizcast::{BatchScheduler, Compositor, Config, ProgressStore};

use super::builders::QuizRecordBuilder;

/// A project root in a temp directory with the default layout underneath.
pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: Config,
    pub paths: ResolvedPaths,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Creates the harness after letting the caller adjust the config.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.paths.project_root = temp_dir.path().to_string_lossy().into_owned();
        config.batch.concurrency_per_render = 2;
        adjust(&mut config);

        let paths = config.resolved_paths();
        fs::create_dir_all(&paths.records_dir).expect("Failed to create records dir");
        fs::create_dir_all(&paths.bundles_dir).expect("Failed to create bundles dir");

        Self {
            temp_dir,
            config,
            paths,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `<records_dir>/<identity>.json`.
    pub fn add_record(&self, identity: &str, record: &QuizRecordBuilder) -> PathBuf {
        self.add_raw_record(identity, &record.to_json())
    }

    pub fn add_raw_record(&self, identity: &str, content: &str) -> PathBuf {
        let path = self.paths.records_dir.join(format!("{}.json", identity));
        fs::write(&path, content).expect("Failed to write record");
        path
    }

    /// Creates the narration bundle with one file per item id.
    pub fn add_bundle(&self, identity: &str, item_ids: &[u64]) -> PathBuf {
        let dir = self.paths.bundles_dir.join(identity);
        fs::create_dir_all(&dir).expect("Failed to create bundle dir");
        for id in item_ids {
            fs::write(dir.join(format!("question_{}.mp3", id)), format!("audio {}", id))
                .expect("Failed to write narration file");
        }
        dir
    }

    /// Record plus matching bundle, the usual ready-to-render job.
    pub fn add_job(&self, identity: &str, question_count: u64) {
        let record = QuizRecordBuilder::with_questions(question_count);
        self.add_record(identity, &record);
        self.add_bundle(identity, &record.item_ids());
    }

    pub fn scheduler(&self, compositor: Arc<dyn Compositor>) -> BatchScheduler {
        BatchScheduler::with_compositor(&self.config, compositor)
    }

    pub fn store(&self) -> ProgressStore {
        ProgressStore::new(&self.paths.progress_file)
    }

    pub fn entry(&self, identity: &str) -> Option<ProgressEntry> {
        self.store().get(identity)
    }

    pub fn progress(&self) -> ProgressMap {
        self.store().load()
    }

    pub fn write_progress(&self, content: &str) {
        if let Some(parent) = self.paths.progress_file.parent() {
            fs::create_dir_all(parent).expect("Failed to create progress dir");
        }
        fs::write(&self.paths.progress_file, content).expect("Failed to write progress file");
    }

    pub fn staged_files(&self) -> Vec<String> {
        let mut files: Vec<String> = fs::read_dir(&self.paths.staging_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
