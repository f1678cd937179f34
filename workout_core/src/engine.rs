//! Session engine: per-trainee registry of active sessions.
//!
//! The engine enforces one active session per trainee, routes driver
//! actions to the right [`Session`], and on finish hands the record to the
//! persistence gateway. Session writes are authoritative; exercise progress
//! rows are best-effort and their failures are collected, not propagated.

use crate::gateway::{GatewayError, SessionGateway};
use crate::rest_timer::{RestTicket, RestTick};
use crate::session::{LoggedSet, Session};
use crate::{Error, FinishDetails, Result, SessionId, SessionRecord, TraineeId, WorkoutPlan};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// A progress row the gateway refused during `finish`
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressFailure {
    pub exercise: String,
    pub error: GatewayError,
}

/// Result of a successful `finish`
#[derive(Clone, Debug)]
pub struct FinishReport {
    pub session_id: SessionId,
    pub record: SessionRecord,
    pub progress_failures: Vec<ProgressFailure>,
}

impl FinishReport {
    pub fn is_complete(&self) -> bool {
        self.progress_failures.is_empty()
    }
}

/// Drives workout sessions for any number of trainees
pub struct WorkoutEngine<G: SessionGateway> {
    gateway: Arc<G>,
    active: HashMap<TraineeId, Session>,
}

impl<G: SessionGateway> WorkoutEngine<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            active: HashMap::new(),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// The trainee's active session, if any
    pub fn session(&self, trainee: &TraineeId) -> Option<&Session> {
        self.active.get(trainee)
    }

    pub fn has_active(&self, trainee: &TraineeId) -> bool {
        self.active.contains_key(trainee)
    }

    /// Begin a session for `trainee` from `plan`
    pub fn start(&mut self, trainee: TraineeId, plan: &WorkoutPlan, now: DateTime<Utc>) -> Result<&Session> {
        if self.active.contains_key(&trainee) {
            tracing::warn!("Refusing to start '{}': {} already training", plan.name, trainee);
            return Err(Error::SessionAlreadyActive(trainee));
        }

        let session = Session::start(trainee.clone(), plan, now)?;
        let session = self.active.entry(trainee).or_insert(session);
        Ok(&*session)
    }

    /// Log a set on the trainee's current exercise
    pub fn log_set(
        &mut self,
        trainee: &TraineeId,
        weight: f64,
        reps: u32,
        now: DateTime<Utc>,
    ) -> Result<LoggedSet> {
        self.active_mut(trainee)?.log_set(weight, reps, now)
    }

    /// Move the trainee to their next exercise
    pub fn advance_exercise(&mut self, trainee: &TraineeId) -> Result<usize> {
        self.active_mut(trainee)?.advance_exercise()
    }

    /// Forward one elapsed unit to the trainee's rest timer
    ///
    /// Returns `Inactive` when the trainee has no session or `ticket` names a
    /// countdown that was replaced or cancelled.
    pub fn tick_rest(&mut self, trainee: &TraineeId, ticket: RestTicket) -> RestTick {
        match self.active.get_mut(trainee) {
            Some(session) => session.tick_rest(ticket),
            None => RestTick::Inactive,
        }
    }

    /// Persist the trainee's session and end it
    ///
    /// If the session write fails the session stays active with every set
    /// intact and the error is returned for the caller to retry.
    pub async fn finish(
        &mut self,
        trainee: &TraineeId,
        now: DateTime<Utc>,
        details: FinishDetails,
    ) -> Result<FinishReport> {
        let record = self.active_mut(trainee)?.to_record(now, &details);

        let session_id = match self.gateway.create_session(&record).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to save session for {}: {}", trainee, e);
                return Err(Error::Persistence(e));
            }
        };

        if let Some(mut session) = self.active.remove(trainee) {
            session.mark_finished();
        }

        tracing::info!(
            "Saved session {} for {}: {} exercises, {} min",
            session_id,
            trainee,
            record.exercises.len(),
            record.minutes_or_zero()
        );

        let mut progress_failures = Vec::new();
        for exercise in &record.exercises {
            if let Err(e) = self
                .gateway
                .create_exercise_progress(session_id, exercise)
                .await
            {
                tracing::warn!(
                    "Progress row for '{}' in session {} not saved: {}",
                    exercise.name,
                    session_id,
                    e
                );
                progress_failures.push(ProgressFailure {
                    exercise: exercise.name.clone(),
                    error: e,
                });
            }
        }

        Ok(FinishReport {
            session_id,
            record,
            progress_failures,
        })
    }

    /// Abandon the trainee's session without persisting anything
    pub fn cancel(&mut self, trainee: &TraineeId) -> Result<()> {
        let mut session = self
            .active
            .remove(trainee)
            .ok_or_else(|| Error::NoActiveSession(trainee.clone()))?;
        session.cancel()
    }

    fn active_mut(&mut self, trainee: &TraineeId) -> Result<&mut Session> {
        self.active
            .get_mut(trainee)
            .ok_or_else(|| Error::NoActiveSession(trainee.clone()))
    }
}
