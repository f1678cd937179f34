//! Lookups over past sessions.
//!
//! Used by drivers to show what the trainee did last time on an exercise.
//! Exercise names are free text, so matching is loose: case and runs of
//! whitespace are ignored.

use crate::{ExerciseEntry, SessionRecord};
use chrono::NaiveDate;

/// The most recent logged work for one exercise
#[derive(Clone, Debug, PartialEq)]
pub struct LastPerformance<'a> {
    pub date: NaiveDate,
    pub entry: &'a ExerciseEntry,
}

impl LastPerformance<'_> {
    /// Heaviest weight logged on that day
    pub fn top_weight(&self) -> f64 {
        self.entry
            .sets
            .iter()
            .map(|s| s.weight)
            .fold(0.0, f64::max)
    }
}

/// Normalize an exercise name for comparison
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find the latest session containing `exercise` with at least one set
pub fn last_performance<'a>(records: &'a [SessionRecord], exercise: &str) -> Option<LastPerformance<'a>> {
    let wanted = normalize_name(exercise);

    records
        .iter()
        .filter(|r| r.completed)
        .filter_map(|r| {
            r.exercises
                .iter()
                .find(|e| !e.is_empty() && normalize_name(&e.name) == wanted)
                .map(|entry| (r, entry))
        })
        .max_by_key(|(r, _)| r.finished_at)
        .map(|(r, entry)| LastPerformance {
            date: r.date,
            entry,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Feeling, SetRecord};
    use chrono::{Duration, TimeZone, Utc};

    fn record(days_ago: i64, exercise: &str, weights: &[f64]) -> SessionRecord {
        let at = Utc.with_ymd_and_hms(2024, 8, 30, 18, 0, 0).unwrap() - Duration::days(days_ago);
        SessionRecord {
            trainee: "ana".into(),
            date: at.date_naive(),
            started_at: at,
            finished_at: at,
            duration_minutes: Some(40),
            plan_name: "legs".into(),
            exercises: vec![ExerciseEntry {
                name: exercise.into(),
                target_sets: 3,
                target_reps: 5,
                rest_seconds: 120,
                sets: weights
                    .iter()
                    .map(|w| SetRecord {
                        weight: *w,
                        reps: 5,
                        completed_at: at,
                    })
                    .collect(),
            }],
            feeling: Feeling::Good,
            notes: None,
            completed: true,
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Back   SQUAT "), "back squat");
    }

    #[test]
    fn test_last_performance_picks_latest_loose_match() {
        let records = vec![
            record(7, "Back Squat", &[100.0, 100.0]),
            record(2, "back  squat", &[105.0, 110.0]),
            record(1, "Deadlift", &[140.0]),
        ];

        let last = last_performance(&records, "BACK SQUAT").unwrap();
        assert_eq!(last.entry.sets.len(), 2);
        assert_eq!(last.top_weight(), 110.0);
    }

    #[test]
    fn test_last_performance_skips_empty_entries() {
        let records = vec![record(3, "Squat", &[90.0]), record(1, "Squat", &[])];
        let last = last_performance(&records, "squat").unwrap();
        assert_eq!(last.top_weight(), 90.0);
    }

    #[test]
    fn test_last_performance_none_when_unknown() {
        let records = vec![record(1, "Squat", &[90.0])];
        assert!(last_performance(&records, "Bench Press").is_none());
    }
}
