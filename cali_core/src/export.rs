//! CSV export of recorded session history.
//!
//! Flattens the full history to one CSV row per session so it can be
//! inspected or charted outside the tracker. Rows are appended; headers
//! are written only when the target file is empty.

use crate::catalog::Catalog;
use crate::types::{Session, WorkoutState};
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    exercise_id: String,
    exercise_name: String,
    recorded_at: String,
    duration_seconds: u32,
    set_count: usize,
    sets: String,
}

impl CsvRow {
    fn new(session: &Session, exercise_name: &str) -> Self {
        CsvRow {
            id: session.id.to_string(),
            exercise_id: session.exercise_id.clone(),
            exercise_name: exercise_name.to_string(),
            recorded_at: session.recorded_at.to_rfc3339(),
            duration_seconds: session.duration_seconds,
            set_count: session.sets.len(),
            sets: render_sets(session),
        }
    }
}

/// Compact one-cell rendering of a session's sets
///
/// "12; 10@5kg" - the weight/time suffix appears only when present.
fn render_sets(session: &Session) -> String {
    session
        .sets
        .iter()
        .map(|set| {
            if set.weight_or_time.is_empty() {
                set.reps.clone()
            } else {
                format!("{}@{}", set.reps, set.weight_or_time)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Export all recorded sessions to a CSV file
///
/// Sessions are written in catalog order, newest first within each
/// exercise (matching the stored history order). Returns the number of
/// rows written.
pub fn export_history(state: &WorkoutState, catalog: &Catalog, csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file has no content yet
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    let mut count = 0;
    for exercise in &catalog.exercises {
        for session in state.sessions_for(&exercise.id) {
            writer.serialize(CsvRow::new(session, &exercise.name))?;
            count += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", count, csv_path);
    Ok(count)
}
