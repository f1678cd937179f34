//! In-progress workout session.
//!
//! A [`Session`] owns its exercise entries, the cursor into them and the
//! rest timer. All operations here are synchronous and in-memory; the
//! engine layers the per-trainee registry and persistence on top.

use crate::rest_timer::{RestTicket, RestTick, RestTimer};
use crate::{
    Error, ExerciseEntry, FinishDetails, Result, SessionRecord, SessionStatus, SetRecord,
    TraineeId, WorkoutPlan,
};
use chrono::{DateTime, Utc};

/// Outcome of logging one set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoggedSet {
    /// Index of the exercise the set was appended to
    pub exercise_index: usize,
    /// Number of sets logged on that exercise, including this one
    pub set_number: usize,
    /// Present when a rest countdown was started for this set
    pub rest: Option<StartedRest>,
}

/// A rest countdown started by `log_set`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartedRest {
    pub ticket: RestTicket,
    pub seconds: u32,
}

/// Short status view for drivers
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub plan_name: String,
    pub current_exercise: usize,
    pub exercise_count: usize,
    pub exercise_name: String,
    pub sets_logged: usize,
    pub target_sets: u32,
    pub target_reps: u32,
    pub rest_remaining: u32,
}

/// One workout instance, from start until finish or cancel
#[derive(Clone, Debug)]
pub struct Session {
    trainee: TraineeId,
    plan_name: String,
    started_at: DateTime<Utc>,
    exercises: Vec<ExerciseEntry>,
    current: usize,
    status: SessionStatus,
    rest: RestTimer,
}

impl Session {
    /// Create an active session from a plan
    ///
    /// Fails with `EmptyPlan` when the plan has no exercises and with
    /// `InvalidPlan` when a prescription has zero sets or reps.
    pub fn start(trainee: TraineeId, plan: &WorkoutPlan, now: DateTime<Utc>) -> Result<Self> {
        validate_plan(plan)?;

        let exercises: Vec<ExerciseEntry> = plan.exercises.iter().map(ExerciseEntry::from).collect();

        tracing::info!(
            "Starting session '{}' for {} with {} exercises",
            plan.name,
            trainee,
            exercises.len()
        );

        Ok(Self {
            trainee,
            plan_name: plan.name.clone(),
            started_at: now,
            exercises,
            current: 0,
            status: SessionStatus::Active,
            rest: RestTimer::new(),
        })
    }

    pub fn trainee(&self) -> &TraineeId {
        &self.trainee
    }

    pub fn plan_name(&self) -> &str {
        &self.plan_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn exercises(&self) -> &[ExerciseEntry] {
        &self.exercises
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current
    }

    pub fn current_exercise(&self) -> &ExerciseEntry {
        &self.exercises[self.current]
    }

    pub fn rest_timer(&self) -> &RestTimer {
        &self.rest
    }

    pub fn is_last_exercise(&self) -> bool {
        self.current + 1 >= self.exercises.len()
    }

    /// Append a set to the current exercise
    ///
    /// Starts (or restarts) the rest countdown unless this set reaches the
    /// prescribed set count or the exercise has no rest configured.
    pub fn log_set(&mut self, weight: f64, reps: u32, now: DateTime<Utc>) -> Result<LoggedSet> {
        self.ensure_active()?;

        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidSet(format!(
                "weight must be a non-negative number, got {}",
                weight
            )));
        }
        if reps < 1 {
            return Err(Error::InvalidSet("reps must be at least 1".into()));
        }

        let index = self.current;
        let entry = &mut self.exercises[index];
        let prior_sets = entry.sets.len();

        entry.sets.push(SetRecord {
            weight,
            reps,
            completed_at: now,
        });

        tracing::debug!(
            "Logged set {} for '{}': {} x {}",
            prior_sets + 1,
            entry.name,
            weight,
            reps
        );

        let rest_seconds = entry.rest_seconds;
        let wants_rest = rest_seconds > 0 && (prior_sets as u64) + 1 < u64::from(entry.target_sets);

        let rest = if wants_rest {
            let ticket = self.rest.start(rest_seconds)?;
            Some(StartedRest {
                ticket,
                seconds: rest_seconds,
            })
        } else {
            None
        };

        Ok(LoggedSet {
            exercise_index: index,
            set_number: prior_sets + 1,
            rest,
        })
    }

    /// Move to the next exercise, dropping any rest countdown
    pub fn advance_exercise(&mut self) -> Result<usize> {
        self.ensure_active()?;

        if self.is_last_exercise() {
            return Err(Error::NoNextExercise);
        }

        self.rest.cancel();
        self.current += 1;

        tracing::info!(
            "Advanced to exercise {}/{}: '{}'",
            self.current + 1,
            self.exercises.len(),
            self.exercises[self.current].name
        );
        Ok(self.current)
    }

    /// Forward one elapsed unit to the rest timer if `ticket` is current
    pub fn tick_rest(&mut self, ticket: RestTicket) -> RestTick {
        if self.status != SessionStatus::Active {
            return RestTick::Inactive;
        }
        self.rest.tick_ticket(ticket)
    }

    /// Build the record that `finish` would persist, without changing state
    ///
    /// Exercises with no logged sets are left out.
    pub fn to_record(&self, finished_at: DateTime<Utc>, details: &FinishDetails) -> SessionRecord {
        let elapsed = finished_at - self.started_at;
        let duration_minutes = (elapsed.num_seconds().max(0)) / 60;

        let exercises: Vec<ExerciseEntry> = self
            .exercises
            .iter()
            .filter(|e| !e.is_empty())
            .cloned()
            .collect();

        SessionRecord {
            trainee: self.trainee.clone(),
            date: self.started_at.date_naive(),
            started_at: self.started_at,
            finished_at,
            duration_minutes: Some(duration_minutes),
            plan_name: self.plan_name.clone(),
            exercises,
            feeling: details.feeling,
            notes: details
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            completed: true,
        }
    }

    /// Mark finished after the record has been accepted by the gateway
    pub(crate) fn mark_finished(&mut self) {
        self.rest.cancel();
        self.status = SessionStatus::Finished;
    }

    /// Stop the timer and mark the session cancelled
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.rest.cancel();
        self.status = SessionStatus::Cancelled;
        tracing::info!("Session '{}' for {} cancelled", self.plan_name, self.trainee);
        Ok(())
    }

    pub fn summary(&self) -> SessionSummary {
        let entry = self.current_exercise();
        SessionSummary {
            plan_name: self.plan_name.clone(),
            current_exercise: self.current,
            exercise_count: self.exercises.len(),
            exercise_name: entry.name.clone(),
            sets_logged: entry.sets.len(),
            target_sets: entry.target_sets,
            target_reps: entry.target_reps,
            rest_remaining: self.rest.remaining(),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.status == SessionStatus::Active {
            Ok(())
        } else {
            Err(Error::NoActiveSession(self.trainee.clone()))
        }
    }
}

/// Check a plan before a session is built from it
pub fn validate_plan(plan: &WorkoutPlan) -> Result<()> {
    if plan.exercises.is_empty() {
        return Err(Error::EmptyPlan);
    }

    for exercise in &plan.exercises {
        if exercise.name.trim().is_empty() {
            return Err(Error::InvalidPlan("exercise name is empty".into()));
        }
        if exercise.target_sets == 0 {
            return Err(Error::InvalidPlan(format!(
                "'{}' needs at least one target set",
                exercise.name
            )));
        }
        if exercise.target_reps == 0 {
            return Err(Error::InvalidPlan(format!(
                "'{}' needs at least one target rep",
                exercise.name
            )));
        }
    }

    Ok(())
}
