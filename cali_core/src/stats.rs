//! Display statistics over workout history and skill progress.
//!
//! Pure aggregation over `WorkoutState` + catalog; nothing here mutates
//! state. The presentation layer renders these on its dashboard.

use crate::catalog::Catalog;
use crate::types::{Category, WorkoutState};
use chrono::{DateTime, Duration, Utc};

/// Aggregates for a training category
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryStats {
    /// All-time session count across the category's exercises
    pub total: usize,
    /// Sessions recorded in the trailing 7-day window
    pub last_7_days: usize,
    /// Gamified level: one level per five recorded sessions
    pub level: u32,
}

/// Aggregates across all Elite skill roadmaps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EliteStats {
    /// Completed roadmap levels as a rounded percentage of all levels
    pub percent: u32,
    /// Skills whose progress sits beyond their last defined level
    pub mastered: usize,
    /// Total number of defined roadmap levels
    pub total_levels: u32,
}

/// Compute session aggregates for one category as of `now`
pub fn category_stats(
    state: &WorkoutState,
    catalog: &Catalog,
    category: Category,
    now: DateTime<Utc>,
) -> CategoryStats {
    let week_ago = now - Duration::days(7);

    let mut total = 0;
    let mut last_7_days = 0;
    for exercise in catalog.by_category(category) {
        for session in state.sessions_for(&exercise.id) {
            total += 1;
            if session.recorded_at > week_ago {
                last_7_days += 1;
            }
        }
    }

    CategoryStats {
        total,
        last_7_days,
        level: (total / 5) as u32 + 1,
    }
}

/// Compute roadmap completion aggregates across all Elite skills
pub fn elite_stats(state: &WorkoutState, catalog: &Catalog) -> EliteStats {
    let mut total_levels = 0u32;
    let mut completed_levels = 0u32;
    let mut mastered = 0usize;

    for exercise in catalog.by_category(Category::Elite) {
        let roadmap_len = exercise.roadmap_len();
        total_levels += roadmap_len;

        let progress = state.skill_level(&exercise.id);
        completed_levels += progress.saturating_sub(1).min(roadmap_len);
        if progress > roadmap_len {
            mastered += 1;
        }
    }

    let percent = if total_levels == 0 {
        0
    } else {
        ((completed_levels as f64 / total_levels as f64) * 100.0).round() as u32
    };

    EliteStats {
        percent,
        mastered,
        total_levels,
    }
}

/// The category trained less this week, if the split is uneven
pub fn weak_point(push: &CategoryStats, pull: &CategoryStats) -> Option<Category> {
    if push.last_7_days < pull.last_7_days {
        Some(Category::Push)
    } else if pull.last_7_days < push.last_7_days {
        Some(Category::Pull)
    } else {
        None
    }
}
