//! Goal evaluation for Elite skill roadmap steps.
//!
//! A roadmap step's goal is free text ("Hold 30s", "5 reps"). At
//! session-finish time the store asks this module whether the logged sets
//! satisfy the goal and what the next skill level would be. Everything here
//! is pure: no state, no IO, no failure paths. A goal that cannot be parsed
//! simply never signals achievement.

use crate::types::SetEntry;

/// Extract the first run of decimal digits embedded in a string
///
/// "Hold 30s" -> Some(30), "10-15" -> Some(10), "Mastery" -> None.
/// A digit run too large for u32 is treated as unparseable.
pub fn embedded_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or("");
    digits.parse().ok()
}

/// Classify a goal as time-based rather than rep-based
///
/// Time-based when the goal contains "sec" or "hold", or any `s` followed
/// by a word boundary (case-insensitive). The word-boundary rule is broad
/// on purpose: it matches "30s" but also the trailing `s` of "reps", and
/// the evaluation rules below are shaped so that rep counts still qualify
/// under the time-based reading.
pub fn is_time_goal(goal: &str) -> bool {
    let lower = goal.to_lowercase();
    if lower.contains("sec") || lower.contains("hold") {
        return true;
    }

    lower.char_indices().any(|(i, c)| {
        c == 's'
            && !matches!(
                lower[i + c.len_utf8()..].chars().next(),
                Some(next) if next.is_ascii_alphanumeric() || next == '_'
            )
    })
}

/// Whether a single logged set meets the numeric target
///
/// Time-based goals accept a qualifying number embedded in either field;
/// rep-based goals only look at `reps`. Values are extracted with the same
/// first-digit-run rule as the target itself.
fn set_qualifies(set: &SetEntry, target: u32, time_based: bool) -> bool {
    let reps_ok = embedded_number(&set.reps).is_some_and(|v| v >= target);
    if time_based {
        reps_ok || embedded_number(&set.weight_or_time).is_some_and(|v| v >= target)
    } else {
        reps_ok
    }
}

/// Whether any logged set satisfies the goal
///
/// The policy is achieve-if-any-set-qualifies, not best-set or all-sets.
/// Goals with no embedded number ("Mastery") are never achieved.
pub fn goal_achieved(goal: &str, sets: &[SetEntry]) -> bool {
    let Some(target) = embedded_number(goal) else {
        return false;
    };
    let time_based = is_time_goal(goal);
    sets.iter().any(|set| set_qualifies(set, target, time_based))
}

/// Compute the level to advance to, if the session earns one
///
/// Advancing from the last defined step yields `roadmap_len + 1`, the
/// sentinel for a mastered skill; nothing beyond that is ever produced.
/// Returns None unless the computed level strictly exceeds
/// `current_level`, keeping progress monotonic.
pub fn advancement(
    goal: &str,
    sets: &[SetEntry],
    active_level: u32,
    roadmap_len: u32,
    current_level: u32,
) -> Option<u32> {
    if !goal_achieved(goal, sets) {
        return None;
    }
    let advanced = (active_level + 1).min(roadmap_len + 1);
    (advanced > current_level).then_some(advanced)
}
