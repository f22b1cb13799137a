use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::error::StoreError;
use crate::progress::entry::{ProgressEntry, ProgressMap, ProgressStatus, ProgressUpdate};

/// Persistent job status map backed by a single JSON file.
///
/// Every read-modify-write goes through one in-process lock, so concurrent
/// updates to different identities never lose each other. Writes land in a
/// temporary file in the same directory and are renamed over the target.
pub struct ProgressStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProgressStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the map. A missing file is an empty map; an unreadable or corrupt
    /// file is an error.
    pub fn try_load(&self) -> Result<ProgressMap, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ProgressMap::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(ProgressMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Reads the map, treating any failure as empty.
    pub fn load(&self) -> ProgressMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!("{}, treating progress as empty", e);
                ProgressMap::new()
            }
        }
    }

    pub fn get(&self, identity: &str) -> Option<ProgressEntry> {
        self.load().remove(identity)
    }

    /// Replaces the whole file with `map`.
    pub fn save(&self, map: &ProgressMap) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write_map(map)
    }

    /// Merges `update` into the entry for `identity` and persists the result.
    /// A job with no entry starts from `ProgressEntry::default()`.
    pub fn update(
        &self,
        identity: &str,
        update: ProgressUpdate,
    ) -> Result<ProgressEntry, StoreError> {
        let _guard = self.lock();

        let mut map = self.load_for_write()?;
        let entry = map.entry(identity.to_string()).or_default();
        entry.apply(update);
        let entry = entry.clone();

        self.write_map(&map)?;
        debug!("Progress for '{}' is now {}", identity, entry.status);
        Ok(entry)
    }

    /// Reverts every `in_progress` entry to `pending` and returns the identities reset.
    pub fn reset_stuck(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock();

        let mut map = self.load_for_write()?;
        let mut reset = Vec::new();
        for (identity, entry) in map.iter_mut() {
            if entry.status == ProgressStatus::InProgress {
                entry.reset_to_pending();
                reset.push(identity.clone());
            }
        }

        if !reset.is_empty() {
            self.write_map(&map)?;
            info!("Reset {} stuck jobs to pending", reset.len());
        }
        Ok(reset)
    }

    /// Map to merge into before a write. A corrupt file starts over; any other
    /// read failure aborts so the existing file is not overwritten.
    fn load_for_write(&self) -> Result<ProgressMap, StoreError> {
        match self.try_load() {
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!("{}, starting from an empty map", e);
                Ok(ProgressMap::new())
            }
            other => other,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Progress store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_map(&self, map: &ProgressMap) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        std::fs::create_dir_all(&parent).map_err(|e| StoreError::CreateDirectory {
            path: parent.clone(),
            source: e,
        })?;

        let json = serde_json::to_string_pretty(map)?;

        let write_err = |e: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source: e,
        };

        let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> ProgressStore {
        ProgressStore::new(temp_dir.path().join("output/progress.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert!(store.try_load().unwrap().is_empty());
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.try_load(), Err(StoreError::Corrupt { .. })));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_update_replaces_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        store
            .update("a", ProgressUpdate::failed("boom"))
            .unwrap();
        assert_eq!(store.try_load().unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        // A directory in place of the file makes every read fail
        std::fs::create_dir_all(store.path()).unwrap();

        let result = store.update("a", ProgressUpdate::failed("boom"));
        assert!(matches!(result, Err(StoreError::Read { .. })));
        assert!(matches!(store.reset_stuck(), Err(StoreError::Read { .. })));
        assert!(store.path().is_dir());
    }

    #[test]
    fn test_update_creates_parent_and_default_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let entry = store
            .update("Ocean Life", ProgressUpdate::default())
            .unwrap();

        assert!(store.path().exists());
        assert_eq!(entry.status, ProgressStatus::InProgress);
        assert_eq!(entry.attempts, 0);
        assert_eq!(store.get("Ocean Life"), Some(entry));
    }

    #[test]
    fn test_update_merges_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .update(
                "a",
                ProgressUpdate::in_progress("template2", "/v/a.mp4").starting_attempt(),
            )
            .unwrap();
        let rendered_at = Utc::now();
        let entry = store
            .update(
                "a",
                ProgressUpdate::completed("template2", "/v/a.mp4", rendered_at),
            )
            .unwrap();

        assert_eq!(entry.status, ProgressStatus::Completed);
        assert_eq!(entry.template_id.as_deref(), Some("template2"));
        assert_eq!(entry.rendered_at, Some(rendered_at));
        assert_eq!(entry.attempts, 1);
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .update("b", ProgressUpdate::failed("Asset bundle missing"))
            .unwrap();
        store
            .update("a", ProgressUpdate::completed("template1", "/v/a.mp4", Utc::now()))
            .unwrap();

        let before = std::fs::read_to_string(store.path()).unwrap();
        let map = store.load();
        store.save(&map).unwrap();
        let after = std::fs::read_to_string(store.path()).unwrap();

        assert_eq!(before, after);
        assert_eq!(store.load(), map);
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_reset_stuck_only_touches_in_progress() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store
            .update(
                "stuck",
                ProgressUpdate::in_progress("template3", "/v/stuck.mp4").starting_attempt(),
            )
            .unwrap();
        store
            .update("done", ProgressUpdate::completed("template1", "/v/done.mp4", Utc::now()))
            .unwrap();
        store
            .update("broken", ProgressUpdate::failed("Process exited with code 1"))
            .unwrap();

        let reset = store.reset_stuck().unwrap();
        assert_eq!(reset, vec!["stuck".to_string()]);

        let map = store.load();
        let stuck = &map["stuck"];
        assert_eq!(stuck.status, ProgressStatus::Pending);
        assert!(stuck.template_id.is_none());
        assert!(stuck.output_file.is_none());
        assert_eq!(stuck.attempts, 1);
        assert_eq!(map["done"].status, ProgressStatus::Completed);
        assert_eq!(map["broken"].status, ProgressStatus::Failed);

        let pending_json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(pending_json["stuck"]["status"], "pending");
    }

    #[test]
    fn test_reset_stuck_without_file_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert!(store.reset_stuck().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&temp_dir));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .update(
                            &format!("job-{:02}", i),
                            ProgressUpdate::status(ProgressStatus::InProgress),
                        )
                        .unwrap();
                    store
                        .update(
                            &format!("job-{:02}", i),
                            ProgressUpdate::status(ProgressStatus::Completed),
                        )
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let map = store.load();
        assert_eq!(map.len(), 16);
        assert!(map
            .values()
            .all(|entry| entry.status == ProgressStatus::Completed));
    }
}
