//! The workout store: single source of truth for session lifecycle,
//! history, and skill progress.
//!
//! The store is an explicit owned object, not a global. The presentation
//! layer issues the commands below and reads state back for rendering;
//! nothing else mutates `WorkoutState`. Every completed mutation persists
//! the full snapshot and then notifies subscribers, so observers always
//! see durable state.
//!
//! Session state machine: Idle --start--> Active --finish|cancel--> Idle.
//! Starting while Active is rejected rather than silently discarding the
//! unsaved sets of the previous session.

use crate::catalog::Catalog;
use crate::goal;
use crate::types::{Category, Session, SetEntry, WorkoutState};
use crate::{Error, Result};
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

/// Callback invoked with the post-mutation state after every command
pub type Subscriber = Box<dyn Fn(&WorkoutState)>;

/// Owns the workout state and the snapshot it persists to
pub struct WorkoutStore {
    catalog: Catalog,
    state: WorkoutState,
    snapshot_path: PathBuf,
    subscribers: Vec<Subscriber>,
}

impl WorkoutStore {
    /// Open a store backed by the given snapshot path
    ///
    /// Loads existing state if present; a missing or corrupt snapshot
    /// yields the default empty state.
    pub fn open(catalog: Catalog, snapshot_path: impl Into<PathBuf>) -> Result<Self> {
        let snapshot_path = snapshot_path.into();
        let state = WorkoutState::load(&snapshot_path)?;
        Ok(Self {
            catalog,
            state,
            snapshot_path,
            subscribers: Vec::new(),
        })
    }

    /// Current state, for rendering
    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    /// The catalog this store resolves exercise ids against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Effective skill level for an exercise (defaults to 1)
    pub fn skill_level(&self, exercise_id: &str) -> u32 {
        self.state.skill_level(exercise_id)
    }

    /// Register a callback to run after every completed mutation
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&WorkoutState) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Begin a session for an exercise, optionally at a specific roadmap level
    ///
    /// Fails with `Error::SessionActive` if a session is already in
    /// progress, so unsaved sets are never silently discarded.
    pub fn start_session(&mut self, exercise_id: &str, level: Option<u32>) -> Result<()> {
        if let Some(active) = &self.state.active_exercise_id {
            return Err(Error::SessionActive(active.clone()));
        }

        self.state.active_exercise_id = Some(exercise_id.to_string());
        self.state.active_level = level;
        self.state.session_started_at = Some(Utc::now());
        self.state.current_sets.clear();

        tracing::info!("Started session for {}", exercise_id);
        self.commit();
        Ok(())
    }

    /// Append a set to the active session
    ///
    /// The free-text fields are accepted as entered; nothing is validated.
    pub fn add_set(&mut self, set: SetEntry) {
        self.state.current_sets.push(set);
        self.commit();
    }

    /// Remove the set at the given position
    ///
    /// An out-of-range index is ignored; remaining sets keep their order.
    pub fn remove_set(&mut self, index: usize) {
        if index < self.state.current_sets.len() {
            self.state.current_sets.remove(index);
            self.commit();
        }
    }

    /// Commit the active session to history and return the recorded session
    ///
    /// No-op returning None when no session is active. For Elite exercises
    /// trained at a specific roadmap level, the logged sets are evaluated
    /// against the step's goal and skill progress advances monotonically.
    /// Goal evaluation can never block the session from being recorded.
    pub fn finish_session(&mut self) -> Option<Session> {
        let (exercise_id, started_at) = match (
            self.state.active_exercise_id.clone(),
            self.state.session_started_at,
        ) {
            (Some(id), Some(at)) => (id, at),
            _ => return None,
        };

        let now = Utc::now();
        let duration_seconds = (now - started_at).num_seconds().max(0) as u32;

        let session = Session {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.clone(),
            recorded_at: now,
            sets: std::mem::take(&mut self.state.current_sets),
            duration_seconds,
        };

        if let Some(level) = self.evaluate_advancement(&exercise_id, &session.sets) {
            tracing::info!("{} advanced to level {}", exercise_id, level);
            self.state.skill_progress.insert(exercise_id.clone(), level);
        }

        self.state
            .history
            .entry(exercise_id)
            .or_default()
            .insert(0, session.clone());

        self.state.active_exercise_id = None;
        self.state.active_level = None;
        self.state.session_started_at = None;

        self.commit();
        Some(session)
    }

    /// Discard the active session without recording anything
    ///
    /// Clears the same fields as `finish_session`, including the active
    /// level.
    pub fn cancel_session(&mut self) {
        if !self.state.session_active() {
            return;
        }

        self.state.active_exercise_id = None;
        self.state.active_level = None;
        self.state.session_started_at = None;
        self.state.current_sets.clear();

        tracing::info!("Cancelled active session");
        self.commit();
    }

    /// Set skill progress for an exercise unconditionally
    ///
    /// Used by manual overrides ("mark as mastered", "revert to level");
    /// the caller is responsible for passing a sane level.
    pub fn update_skill_progress(&mut self, exercise_id: &str, level: u32) {
        self.state
            .skill_progress
            .insert(exercise_id.to_string(), level);
        self.commit();
    }

    /// Remove stored progress, reverting the effective level to 1
    pub fn reset_skill_progress(&mut self, exercise_id: &str) {
        self.state.skill_progress.remove(exercise_id);
        self.commit();
    }

    /// Compute the new skill level earned by the just-logged sets, if any
    ///
    /// Applies only to Elite exercises trained at a specific roadmap level,
    /// and only when the result beats the stored value.
    fn evaluate_advancement(&self, exercise_id: &str, sets: &[SetEntry]) -> Option<u32> {
        let active_level = self.state.active_level?;
        let exercise = self.catalog.find(exercise_id)?;
        if exercise.category != Category::Elite {
            return None;
        }
        let step = exercise.roadmap_step(active_level)?;

        goal::advancement(
            &step.goal,
            sets,
            active_level,
            exercise.roadmap_len(),
            self.state.skill_level(exercise_id),
        )
    }

    /// Persist the snapshot and notify subscribers
    ///
    /// A failed write is logged and does not abort the command; in-memory
    /// state stays authoritative for the rest of the process lifetime.
    fn commit(&mut self) {
        if let Err(e) = self.state.save(&self.snapshot_path) {
            tracing::warn!(
                "Failed to persist snapshot to {:?}: {}",
                self.snapshot_path,
                e
            );
        }
        for subscriber in &self.subscribers {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    fn open_store(dir: &Path) -> WorkoutStore {
        WorkoutStore::open(build_default_catalog(), dir.join("state.json")).unwrap()
    }

    #[test]
    fn test_add_and_remove_sets_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("10", ""));
        store.add_set(SetEntry::new("8", "5kg"));
        store.add_set(SetEntry::new("6", ""));

        store.remove_set(1);
        let sets = &store.state().current_sets;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].reps, "10");
        assert_eq!(sets[1].reps, "6");
    }

    #[test]
    fn test_remove_set_out_of_range_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("10", ""));
        store.remove_set(5);

        assert_eq!(store.state().current_sets.len(), 1);
    }

    #[test]
    fn test_finish_without_active_session_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        assert!(store.finish_session().is_none());
        assert!(store.state().history.is_empty());
        assert!(!store.state().session_active());
    }

    #[test]
    fn test_finish_prepends_session_to_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("12", ""));
        let first = store.finish_session().unwrap();

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("15", ""));
        let second = store.finish_session().unwrap();

        let sessions = store.state().sessions_for("push-1");
        assert_eq!(sessions.len(), 2);
        // Newest first
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);

        // Other exercises untouched
        assert!(store.state().sessions_for("push-2").is_empty());
        // Back to idle, ready for the next session
        assert!(!store.state().session_active());
        assert!(store.state().current_sets.is_empty());
    }

    #[test]
    fn test_session_duration_close_to_elapsed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("pull-3", None).unwrap();
        let session = store.finish_session().unwrap();

        // Start and finish within the same test run
        assert!(session.duration_seconds <= 1);
    }

    #[test]
    fn test_start_while_active_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("10", ""));

        let err = store.start_session("pull-1", None).unwrap_err();
        assert!(matches!(err, Error::SessionActive(ref id) if id == "push-1"));

        // The in-flight session survives the rejected start
        assert_eq!(store.state().active_exercise_id.as_deref(), Some("push-1"));
        assert_eq!(store.state().current_sets.len(), 1);
    }

    #[test]
    fn test_cancel_clears_all_active_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("elite-1", Some(2)).unwrap();
        store.add_set(SetEntry::new("5", ""));
        store.cancel_session();

        let state = store.state();
        assert!(state.active_exercise_id.is_none());
        assert!(state.active_level.is_none());
        assert!(state.session_started_at.is_none());
        assert!(state.current_sets.is_empty());
        // Nothing was recorded
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_rep_goal_advances_skill_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        // elite-3 level 1 (High Pull-ups) has goal "5 reps"
        store.start_session("elite-3", Some(1)).unwrap();
        store.add_set(SetEntry::new("5", ""));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-3"), 2);
    }

    #[test]
    fn test_missed_rep_goal_leaves_progress_at_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("elite-3", Some(1)).unwrap();
        store.add_set(SetEntry::new("3", ""));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-3"), 1);
        assert!(!store.state().skill_progress.contains_key("elite-3"));
    }

    #[test]
    fn test_time_goal_advances_via_weight_or_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        // elite-1 level 1 (Wall Hold) has goal "Hold 30s"
        store.start_session("elite-1", Some(1)).unwrap();
        store.add_set(SetEntry::new("1", "35s"));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-1"), 2);
    }

    #[test]
    fn test_time_goal_advances_via_reps_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("elite-1", Some(1)).unwrap();
        store.add_set(SetEntry::new("35", ""));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-1"), 2);
    }

    #[test]
    fn test_time_goal_missed_does_not_advance() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.start_session("elite-1", Some(1)).unwrap();
        store.add_set(SetEntry::new("20", ""));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-1"), 1);
    }

    #[test]
    fn test_progress_never_regresses() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.update_skill_progress("elite-3", 3);

        // Re-training level 1 to success would compute level 2
        store.start_session("elite-3", Some(1)).unwrap();
        store.add_set(SetEntry::new("5", ""));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-3"), 3);
    }

    #[test]
    fn test_session_without_level_skips_goal_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        // Freestyle Elite session: no roadmap level targeted
        store.start_session("elite-1", None).unwrap();
        store.add_set(SetEntry::new("100", "100s"));
        store.finish_session().unwrap();

        assert_eq!(store.skill_level("elite-1"), 1);
    }

    #[test]
    fn test_manual_mastery_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        // "Mark as Mastered" on a 4-level roadmap stores the sentinel 5
        store.update_skill_progress("elite-2", 5);
        assert_eq!(store.skill_level("elite-2"), 5);

        store.reset_skill_progress("elite-2");
        assert_eq!(store.skill_level("elite-2"), 1);
        assert!(!store.state().skill_progress.contains_key("elite-2"));
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = open_store(dir.path());
            store.start_session("pull-4", None).unwrap();
            store.add_set(SetEntry::new("8", ""));
            store.finish_session().unwrap();
            store.update_skill_progress("elite-1", 2);
        }

        let store = open_store(dir.path());
        assert_eq!(store.state().sessions_for("pull-4").len(), 1);
        assert_eq!(store.skill_level("elite-1"), 2);
    }

    #[test]
    fn test_subscribers_notified_after_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| {
            sink.borrow_mut().push(state.current_sets.len());
        });

        store.start_session("push-1", None).unwrap();
        store.add_set(SetEntry::new("10", ""));
        store.add_set(SetEntry::new("8", ""));
        store.finish_session().unwrap();

        // start, two adds, finish - each notified with post-mutation state
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 0]);
    }
}
