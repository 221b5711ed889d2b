// On-disk persistence for AppState (data.json) and Settings (settings.json)

use anyhow::{Context, Result};
use chrono::Local;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLockWriteGuard};

use super::{AppState, Settings};
use crate::config::constants::{SETTINGS_FILE, STATE_FILE};
use crate::model::Course;

const LOCK_FILE: &str = ".coursesync.lock";

/// data.json layout: the state plus a write timestamp
#[derive(Serialize)]
struct DataFile<'a> {
    timestamp: String,
    #[serde(flatten)]
    state: &'a AppState,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
    /// Held from snapshot to write so saves land in mutation order
    write_order: Arc<Mutex<()>>,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_order: Arc::new(Mutex::new(())),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Load state, falling back to an empty state when data.json is
    /// missing or unreadable. Settings are defaults overlaid by
    /// settings.json and written back so the file always lists every key.
    pub fn load(&self) -> Result<AppState> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;

        let mut state = match read_json::<AppState>(&self.data_path()) {
            Ok(Some(state)) => state,
            Ok(None) => AppState::default(),
            Err(e) => {
                tracing::warn!("Starting with empty state: {:#}", e);
                AppState::default()
            }
        };

        state.settings = match read_json::<Settings>(&self.settings_path()) {
            Ok(Some(settings)) => settings,
            Ok(None) => state.settings.clone(),
            Err(e) => {
                tracing::warn!("Ignoring settings file: {:#}", e);
                Settings::default()
            }
        };
        if let Err(e) = state.settings.validate() {
            tracing::warn!("Saved settings are invalid ({}), using defaults", e);
            state.settings = Settings::default();
        }

        self.save_settings(&state.settings)?;

        tracing::debug!(
            courses = state.courses.len(),
            assignments = state.assignments.len(),
            dir = %self.dir.display(),
            "Loaded state"
        );
        Ok(state)
    }

    /// Persist data.json and settings.json
    pub fn save(&self, state: &AppState) -> Result<()> {
        let file = DataFile {
            timestamp: Local::now().to_rfc3339(),
            state,
        };
        let _lock = self.lock()?;
        write_atomic(&self.data_path(), &file)?;
        write_atomic(&self.settings_path(), &state.settings)
    }

    /// Persist shared state from async code.
    ///
    /// The state is snapshotted under `guard`, which is released before the
    /// file I/O runs on the blocking pool.
    pub async fn persist(&self, guard: RwLockWriteGuard<'_, AppState>) -> Result<()> {
        let snapshot = guard.clone();
        let _slot = Arc::clone(&self.write_order).lock_owned().await;
        drop(guard);

        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .context("State save task failed")?
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let _lock = self.lock()?;
        write_atomic(&self.settings_path(), settings)
    }

    fn lock(&self) -> Result<FileLock> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;
        let path = self.dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", path.display()))?;
        Ok(FileLock(file))
    }
}

/// Releases the exclusive lock on drop
struct FileLock(File);

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.0.unlock() {
            tracing::warn!("Failed to release state lock: {}", e);
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;

    fs::write(&temp_path, json)
        .with_context(|| format!("Failed to write to {}", temp_path.display()))?;

    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })
}

/// Write a timestamped snapshot of the courses for safekeeping
pub fn export_snapshot(state: &AppState, dir: &Path) -> Result<PathBuf> {
    #[derive(Serialize)]
    struct Snapshot<'a> {
        timestamp: String,
        courses: &'a [Course],
        total_assignments: usize,
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let now = Local::now();
    let path = dir.join(format!("coursesync_data_{}.json", now.format("%Y%m%d_%H%M%S")));
    let snapshot = Snapshot {
        timestamp: now.to_rfc3339(),
        courses: &state.courses,
        total_assignments: state.assignments.len(),
    };
    write_atomic(&path, &snapshot)?;

    tracing::info!(path = %path.display(), "Exported snapshot");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SettingsUpdate;
    use tempfile::TempDir;

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        let course: Course = serde_json::from_value(serde_json::json!({
            "course_name": "Chemistry",
            "course_code": "CHEM 110",
            "assignments": [
                {"name": "Lab 1", "type": "homework", "due_date": "2025-09-20"}
            ]
        }))
        .unwrap();
        state.add_course(course);
        state.mark_sent("0123456789abcdef");
        state
    }

    #[test]
    fn test_missing_files_give_defaults_and_write_settings() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested"));

        let state = store.load().unwrap();
        assert!(state.courses.is_empty());
        assert_eq!(state.settings, Settings::default());
        assert!(store.settings_path().exists());
    }

    #[tokio::test]
    async fn test_persist_releases_lock_before_writing() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let shared = Arc::new(tokio::sync::RwLock::new(sample_state()));

        let mut guard = shared.write().await;
        guard.update_progress(0, 75).unwrap();
        store.persist(guard).await.unwrap();

        assert!(shared.try_read().is_ok());
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.assignments[0].progress, 75);
    }

    #[tokio::test]
    async fn test_concurrent_persists_keep_last_change() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        let shared = Arc::new(tokio::sync::RwLock::new(sample_state()));

        let mut tasks = Vec::new();
        for progress in [10, 20, 30, 40] {
            let (store, shared) = (store.clone(), Arc::clone(&shared));
            tasks.push(tokio::spawn(async move {
                let mut guard = shared.write().await;
                guard.update_progress(0, progress).unwrap();
                store.persist(guard).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let last = shared.read().await.assignments[0].progress;
        assert_eq!(store.load().unwrap().assignments[0].progress, last);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());

        let mut state = sample_state();
        state.update_progress(0, 40).unwrap();
        SettingsUpdate {
            hours_per_day: Some(6),
            ..Default::default()
        }
        .apply(&mut state.settings)
        .unwrap();
        store.save(&state).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.courses.len(), 1);
        assert_eq!(reloaded.courses[0].id, state.courses[0].id);
        assert_eq!(reloaded.assignments[0].progress, 40);
        assert_eq!(reloaded.settings.hours_per_day, 6);
        assert!(reloaded.was_sent("0123456789abcdef"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.data_path()).unwrap()).unwrap();
        assert!(raw.get("timestamp").is_some());
        assert!(raw.get("sent_notifications").unwrap().is_array());
        assert!(!store.data_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_data_file_gives_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.data_path(), "{ not json").unwrap();

        let state = store.load().unwrap();
        assert!(state.courses.is_empty());
        assert!(state.assignments.is_empty());
    }

    #[test]
    fn test_settings_file_overlays_defaults() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(
            store.settings_path(),
            r#"{"risk_threshold": 12, "email_enabled": true}"#,
        )
        .unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.settings.risk_threshold, 12.0);
        assert_eq!(state.settings.hours_per_day, 4);

        let written = fs::read_to_string(store.settings_path()).unwrap();
        assert!(written.contains("notification_poll_seconds"));
        assert!(!written.contains("email_enabled"));
    }

    #[test]
    fn test_invalid_saved_settings_fall_back() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.settings_path(), r#"{"hours_per_day": 0}"#).unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.settings, Settings::default());
    }

    #[test]
    fn test_export_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = export_snapshot(&sample_state(), dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("coursesync_data_"));
        assert!(name.ends_with(".json"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["total_assignments"], 1);
        assert_eq!(raw["courses"][0]["course_name"], "Chemistry");
        assert!(raw["timestamp"].is_string());
    }
}
