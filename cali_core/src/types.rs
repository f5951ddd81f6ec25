//! Core domain types for the Cali skill tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their categories
//! - Elite skill roadmaps and levels
//! - Logged sets and recorded sessions
//! - The persistent workout state aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Category an exercise belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Push,
    Pull,
    Elite,
}

impl Category {
    /// Display label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            Category::Push => "Push",
            Category::Pull => "Pull",
            Category::Elite => "Elite Skills",
        }
    }
}

/// One step on an Elite skill roadmap
///
/// `goal` is free text shown to the user; it may embed a numeric target
/// and a unit hint (e.g. "Hold 30s", "5 reps"). The goal evaluator parses
/// it at session-finish time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillLevel {
    pub level: u32,
    pub name: String,
    pub goal: String,
}

/// An exercise definition (e.g. "Pushups", "Handstand")
///
/// `roadmap` is present only for Elite exercises and lists skill levels
/// numbered 1..N with no gaps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub roadmap: Option<Vec<SkillLevel>>,
}

impl Exercise {
    /// Number of defined roadmap levels (0 for non-Elite exercises)
    pub fn roadmap_len(&self) -> u32 {
        self.roadmap.as_ref().map(|r| r.len() as u32).unwrap_or(0)
    }

    /// Find a roadmap step by its 1-based level number
    pub fn roadmap_step(&self, level: u32) -> Option<&SkillLevel> {
        self.roadmap
            .as_ref()
            .and_then(|r| r.iter().find(|s| s.level == level))
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// One logged unit of work within a session
///
/// Both fields are free text: the user may enter "10", "10s", or "Fail".
/// `weight_or_time` may be empty. No validation happens at entry time.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetEntry {
    pub reps: String,
    pub weight_or_time: String,
}

impl SetEntry {
    pub fn new(reps: impl Into<String>, weight_or_time: impl Into<String>) -> Self {
        Self {
            reps: reps.into(),
            weight_or_time: weight_or_time.into(),
        }
    }
}

/// A recorded workout session
///
/// Immutable once created: sessions are only ever prepended to history,
/// never edited or reordered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub exercise_id: String,
    pub recorded_at: DateTime<Utc>,
    pub sets: Vec<SetEntry>,
    pub duration_seconds: u32,
}

// ============================================================================
// Workout State
// ============================================================================

/// The persistent workout state aggregate
///
/// Persisted in full on every mutation. `history` entries are newest-first.
/// A `skill_progress` entry of `roadmap_len + 1` marks a mastered skill;
/// absence of an entry means level 1.
///
/// The active-session fields move together: either all are set (a session
/// is in progress) or all are cleared (idle).
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct WorkoutState {
    #[serde(default)]
    pub history: HashMap<String, Vec<Session>>,

    #[serde(default)]
    pub skill_progress: HashMap<String, u32>,

    #[serde(default)]
    pub active_exercise_id: Option<String>,

    #[serde(default)]
    pub active_level: Option<u32>,

    #[serde(default)]
    pub session_started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub current_sets: Vec<SetEntry>,
}

impl WorkoutState {
    /// Whether a session is currently in progress
    pub fn session_active(&self) -> bool {
        self.active_exercise_id.is_some()
    }

    /// Effective skill level for an exercise (defaults to 1)
    pub fn skill_level(&self, exercise_id: &str) -> u32 {
        self.skill_progress.get(exercise_id).copied().unwrap_or(1)
    }

    /// Recorded sessions for an exercise, newest first
    pub fn sessions_for(&self, exercise_id: &str) -> &[Session] {
        self.history
            .get(exercise_id)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}
