//! Builders for test data and test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use quizcast::render::{Compositor, RenderRequest};
use quizcast::RenderError;

/// Builder for quiz record JSON.
pub struct QuizRecordBuilder {
    items: Vec<Value>,
}

impl QuizRecordBuilder {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// A record with `count` valid questions numbered from 1.
    pub fn with_questions(count: u64) -> Self {
        (1..=count).fold(Self::new(), |builder, id| {
            builder.question(
                id,
                &format!("Question {}?", id),
                &["Alpha", "Beta", "Gamma"],
                "Beta",
            )
        })
    }

    pub fn question(mut self, id: u64, text: &str, options: &[&str], answer: &str) -> Self {
        self.items.push(json!({
            "question_id": id,
            "question": text,
            "options": options,
            "answer": answer,
        }));
        self
    }

    pub fn item_ids(&self) -> Vec<u64> {
        self.items
            .iter()
            .filter_map(|item| item["question_id"].as_u64())
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&json!({ "quiz": self.items })).unwrap()
    }
}

impl Default for QuizRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// What the recording compositor does for a given job.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Succeed,
    Exit(i32),
    SpawnFailure(String),
}

/// One observed render call.
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub job_id: String,
    pub template_id: String,
    pub total_frames: u64,
    pub concurrency: usize,
    /// Narration files present in the staging directory during the render.
    pub staged_files: Vec<String>,
}

/// Compositor double that records every call and never spawns a process.
pub struct RecordingCompositor {
    staging_dir: PathBuf,
    outcomes: HashMap<String, RenderOutcome>,
    delay: Duration,
    calls: Mutex<Vec<RenderCall>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingCompositor {
    pub fn new(staging_dir: &Path) -> Self {
        Self {
            staging_dir: staging_dir.to_path_buf(),
            outcomes: HashMap::new(),
            delay: Duration::from_millis(0),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_outcome(mut self, job_id: &str, outcome: RenderOutcome) -> Self {
        self.outcomes.insert(job_id.to_string(), outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called_jobs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.job_id).collect()
    }

    /// Highest number of renders seen running at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn staged_files(&self) -> Vec<String> {
        let mut files: Vec<String> = std::fs::read_dir(&self.staging_dir)
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

#[async_trait]
impl Compositor for RecordingCompositor {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        self.calls.lock().unwrap().push(RenderCall {
            job_id: request.job.id.clone(),
            template_id: request.template.id.to_string(),
            total_frames: request.plan.total_frames,
            concurrency: request.concurrency,
            staged_files: self.staged_files(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(&request.job.id) {
            None | Some(RenderOutcome::Succeed) => Ok(()),
            Some(RenderOutcome::Exit(code)) => Err(RenderError::Exit { code: *code }),
            Some(RenderOutcome::SpawnFailure(message)) => Err(RenderError::Spawn {
                message: message.clone(),
            }),
        }
    }
}
