//! CSV export of persisted sessions.
//!
//! Writes one row per logged set so the file opens cleanly in a
//! spreadsheet. The file is written to a temp file in the target directory,
//! synced, then renamed over the destination.

use crate::{Error, Result, SessionRecord};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    trainee: &'a str,
    plan: &'a str,
    duration_minutes: Option<i64>,
    feeling: String,
    exercise: &'a str,
    set: usize,
    weight: f64,
    reps: u32,
    completed_at: String,
    notes: Option<&'a str>,
}

/// Write every set in `records` to `csv_path`, returning the row count
///
/// Sessions without any sets still get one row with zeroed set columns.
pub fn export_sessions(records: &[SessionRecord], csv_path: &Path) -> Result<usize> {
    let parent = match csv_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut rows = 0;
    for record in records {
        let feeling = record.feeling.to_string();
        let date = record.date.to_string();

        let mut wrote_any = false;
        for exercise in &record.exercises {
            for (i, set) in exercise.sets.iter().enumerate() {
                writer.serialize(CsvRow {
                    date: date.clone(),
                    trainee: record.trainee.as_str(),
                    plan: &record.plan_name,
                    duration_minutes: record.duration_minutes,
                    feeling: feeling.clone(),
                    exercise: &exercise.name,
                    set: i + 1,
                    weight: set.weight,
                    reps: set.reps,
                    completed_at: set.completed_at.to_rfc3339(),
                    notes: record.notes.as_deref(),
                })?;
                rows += 1;
                wrote_any = true;
            }
        }

        if !wrote_any {
            writer.serialize(CsvRow {
                date,
                trainee: record.trainee.as_str(),
                plan: &record.plan_name,
                duration_minutes: record.duration_minutes,
                feeling,
                exercise: "",
                set: 0,
                weight: 0.0,
                reps: 0,
                completed_at: record.finished_at.to_rfc3339(),
                notes: record.notes.as_deref(),
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    drop(writer);

    temp.as_file().sync_all()?;
    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} rows from {} sessions to {:?}", rows, records.len(), csv_path);
    Ok(rows)
}
