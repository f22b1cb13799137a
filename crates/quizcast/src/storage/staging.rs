use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, info};
use tokio::sync::{Mutex, MutexGuard};
use walkdir::WalkDir;

use crate::config::{ResolvedPaths, StagingConfig};
use crate::error::StagingError;

/// Copies narration bundles into the single directory the compositor reads from.
pub struct AssetStager {
    bundles_dir: PathBuf,
    staging_dir: PathBuf,
    naming: StagingConfig,
    exclusive: Mutex<()>,
}

/// Exclusive hold on the staging directory. Only a lease holder can stage.
pub struct StagingLease<'a> {
    stager: &'a AssetStager,
    _guard: MutexGuard<'a, ()>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAssets {
    pub copied: usize,
    pub removed: usize,
}

impl AssetStager {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        bundles_dir: P,
        staging_dir: Q,
        naming: StagingConfig,
    ) -> Self {
        Self {
            bundles_dir: bundles_dir.as_ref().to_path_buf(),
            staging_dir: staging_dir.as_ref().to_path_buf(),
            naming,
            exclusive: Mutex::new(()),
        }
    }

    pub fn from_paths(paths: &ResolvedPaths, naming: StagingConfig) -> Self {
        Self::new(&paths.bundles_dir, &paths.staging_dir, naming)
    }

    pub fn bundles_dir(&self) -> &Path {
        &self.bundles_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn bundle_path(&self, bundle_name: &str) -> PathBuf {
        self.bundles_dir.join(bundle_name)
    }

    pub fn bundle_exists(&self, bundle_name: &str) -> bool {
        self.bundle_path(bundle_name).is_dir()
    }

    /// Waits until no other job holds the staging directory.
    pub async fn acquire(&self) -> StagingLease<'_> {
        let guard = self.exclusive.lock().await;
        StagingLease {
            stager: self,
            _guard: guard,
        }
    }

    /// Item ids whose narration file is absent from the bundle.
    pub fn missing_narration(&self, bundle_name: &str, item_ids: &[u64]) -> Vec<u64> {
        let bundle = self.bundle_path(bundle_name);
        item_ids
            .iter()
            .copied()
            .filter(|id| !bundle.join(self.naming.file_name_for(*id)).is_file())
            .collect()
    }

    fn narration_pattern(&self) -> Result<Pattern, StagingError> {
        let pattern = self.naming.glob_pattern();
        Pattern::new(&pattern).map_err(|e| StagingError::InvalidPattern {
            pattern,
            reason: e.to_string(),
        })
    }
}

impl StagingLease<'_> {
    /// Replaces the staged narration files with the ones from `bundle_name`.
    pub fn stage(&self, bundle_name: &str) -> Result<StagedAssets, StagingError> {
        let stager = self.stager;
        let bundle = stager.bundle_path(bundle_name);
        if !bundle.is_dir() {
            return Err(StagingError::BundleMissing(bundle));
        }

        let pattern = stager.narration_pattern()?;
        ensure_directory(&stager.staging_dir)?;

        let removed = clear_staged(&stager.staging_dir, &pattern)?;
        let copied = copy_matching(&bundle, &stager.staging_dir, &pattern)?;

        info!(
            "Staged {} narration files for '{}' ({} stale removed)",
            copied, bundle_name, removed
        );
        Ok(StagedAssets { copied, removed })
    }
}

fn ensure_directory(path: &Path) -> Result<(), StagingError> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| StagingError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Narration files directly inside `dir`, in file-name order.
fn matching_files(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>, StagingError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| StagingError::ListDirectory {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| pattern.matches(name))
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn clear_staged(staging_dir: &Path, pattern: &Pattern) -> Result<usize, StagingError> {
    let stale = matching_files(staging_dir, pattern)?;
    for path in &stale {
        std::fs::remove_file(path).map_err(|e| StagingError::RemoveFile {
            path: path.clone(),
            source: e,
        })?;
        debug!("Removed staged file {:?}", path.file_name());
    }
    Ok(stale.len())
}

fn copy_matching(bundle: &Path, staging_dir: &Path, pattern: &Pattern) -> Result<usize, StagingError> {
    let files = matching_files(bundle, pattern)?;
    for from in &files {
        // matching_files only yields entries with a UTF-8 file name
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = staging_dir.join(name);
        std::fs::copy(from, &to).map_err(|e| StagingError::CopyFile {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })?;
    }
    Ok(files.len())
}
