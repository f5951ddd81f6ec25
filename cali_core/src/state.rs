//! Workout state persistence with file locking.
//!
//! The full `WorkoutState` aggregate is written as a single JSON snapshot
//! on every mutation and read back once at startup. A missing or corrupt
//! snapshot is never fatal: loading degrades to the default empty state.

use crate::{Error, Result, WorkoutState};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl WorkoutState {
    /// Load workout state from a snapshot file with shared locking
    ///
    /// Returns default state if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No snapshot found, using default state");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open snapshot {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock snapshot {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read snapshot {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<WorkoutState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded workout state from {:?}", path);
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse snapshot {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save workout state to a snapshot file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old snapshot
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved workout state to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Session, SetEntry};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("state.json");

        let mut state = WorkoutState::default();
        state.history.insert(
            "push-1".into(),
            vec![
                Session {
                    id: Uuid::new_v4(),
                    exercise_id: "push-1".into(),
                    recorded_at: Utc::now(),
                    sets: vec![SetEntry::new("12", ""), SetEntry::new("10", "5kg")],
                    duration_seconds: 320,
                },
                Session {
                    id: Uuid::new_v4(),
                    exercise_id: "push-1".into(),
                    recorded_at: Utc::now(),
                    sets: vec![SetEntry::new("8", "")],
                    duration_seconds: 150,
                },
            ],
        );
        state.skill_progress.insert("elite-1".into(), 3);

        state.save(&snapshot_path).unwrap();
        let loaded = WorkoutState::load(&snapshot_path).unwrap();

        assert_eq!(loaded.skill_progress.get("elite-1"), Some(&3));
        let sessions = loaded.sessions_for("push-1");
        assert_eq!(sessions.len(), 2);
        // Order within a history array must survive the roundtrip
        assert_eq!(sessions[0].duration_seconds, 320);
        assert_eq!(sessions[1].duration_seconds, 150);
        assert_eq!(sessions[0].sets[1], SetEntry::new("10", "5kg"));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("nonexistent.json");

        let state = WorkoutState::load(&snapshot_path).unwrap();
        assert!(state.history.is_empty());
        assert!(state.skill_progress.is_empty());
        assert!(!state.session_active());
    }

    #[test]
    fn test_corrupted_snapshot_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("corrupted.json");

        std::fs::write(&snapshot_path, "{ invalid json }").unwrap();

        let state = WorkoutState::load(&snapshot_path).unwrap();
        assert!(state.history.is_empty());
        assert!(state.skill_progress.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("partial.json");

        // Older snapshots may lack fields entirely
        std::fs::write(&snapshot_path, r#"{"skill_progress":{"elite-2":2}}"#).unwrap();

        let state = WorkoutState::load(&snapshot_path).unwrap();
        assert_eq!(state.skill_level("elite-2"), 2);
        assert!(state.history.is_empty());
        assert!(state.current_sets.is_empty());
        assert!(!state.session_active());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot_path = temp_dir.path().join("state.json");

        let state = WorkoutState::default();
        state.save(&snapshot_path).unwrap();

        // Verify snapshot exists and no stray temp files remain
        assert!(snapshot_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only state.json, found extras: {:?}",
            extras
        );
    }
}
