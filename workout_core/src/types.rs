//! Core domain types for the workout session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Trainee identity and session ids
//! - Workout plans and their prescriptions
//! - Logged sets and exercise entries
//! - Persisted session records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier handed back by the gateway for a stored session
pub type SessionId = Uuid;

// ============================================================================
// Trainee
// ============================================================================

/// The person performing and logging a workout
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraineeId(String);

impl TraineeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraineeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TraineeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// One exercise prescription within a workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
    #[serde(default)]
    pub rest_seconds: u32,
}

impl PlannedExercise {
    pub fn new(name: impl Into<String>, target_sets: u32, target_reps: u32, rest_seconds: u32) -> Self {
        Self {
            name: name.into(),
            target_sets,
            target_reps,
            rest_seconds,
        }
    }
}

/// An ordered list of exercises to perform in one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

// ============================================================================
// Logged Work
// ============================================================================

/// One logged repetition set. Never edited after it is appended.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub weight: f64,
    pub reps: u32,
    pub completed_at: DateTime<Utc>,
}

impl SetRecord {
    /// Training volume of this set (weight × reps)
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// One exercise within a session: the prescription plus the sets logged so far
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
    pub rest_seconds: u32,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

impl From<&PlannedExercise> for ExerciseEntry {
    fn from(planned: &PlannedExercise) -> Self {
        Self {
            name: planned.name.clone(),
            target_sets: planned.target_sets,
            target_reps: planned.target_reps,
            rest_seconds: planned.rest_seconds,
            sets: Vec::new(),
        }
    }
}

impl ExerciseEntry {
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sum of weight × reps over every logged set
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(SetRecord::volume).sum()
    }
}

// ============================================================================
// Session Metadata
// ============================================================================

/// Subjective tag the trainee attaches when finishing
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Great,
    Good,
    #[default]
    Normal,
    Tired,
    Bad,
}

impl FromStr for Feeling {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "great" => Ok(Feeling::Great),
            "good" => Ok(Feeling::Good),
            "normal" | "ok" => Ok(Feeling::Normal),
            "tired" => Ok(Feeling::Tired),
            "bad" => Ok(Feeling::Bad),
            other => Err(crate::Error::UnknownFeeling(other.to_string())),
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Feeling::Great => "great",
            Feeling::Good => "good",
            Feeling::Normal => "normal",
            Feeling::Tired => "tired",
            Feeling::Bad => "bad",
        };
        f.write_str(s)
    }
}

/// Lifecycle status of a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Finished,
    Cancelled,
}

/// Free-form details supplied by the trainee at finish time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinishDetails {
    pub feeling: Feeling,
    pub notes: Option<String>,
}

// ============================================================================
// Persisted Record
// ============================================================================

/// The shape of a finished session as handed to the persistence gateway
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub trainee: TraineeId,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Whole minutes, floored. Older or foreign rows may lack it.
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub feeling: Feeling,
    #[serde(default)]
    pub notes: Option<String>,
    pub completed: bool,
}

impl SessionRecord {
    /// Duration for aggregation; missing or negative values count as zero
    pub fn minutes_or_zero(&self) -> u64 {
        self.duration_minutes
            .filter(|m| *m > 0)
            .map(|m| m as u64)
            .unwrap_or(0)
    }

    /// Sum of weight × reps over every set in the session
    pub fn volume(&self) -> f64 {
        self.exercises.iter().map(ExerciseEntry::volume).sum()
    }
}
