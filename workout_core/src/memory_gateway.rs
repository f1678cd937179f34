//! In-memory gateway.
//!
//! Backs tests and short-lived drivers. Failure injection lets callers
//! simulate a backend that refuses session writes or individual exercise
//! rows.

use crate::gateway::{GatewayError, GatewayResult, SessionGateway};
use crate::{ExerciseEntry, SessionId, SessionRecord, TraineeId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    sessions: Vec<(SessionId, SessionRecord)>,
    progress: Vec<(SessionId, ExerciseEntry)>,
    session_attempts: usize,
    fail_sessions: bool,
    fail_progress_for: HashSet<String>,
}

/// Mutex-guarded in-memory session store
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing history
    pub fn with_sessions(records: impl IntoIterator<Item = SessionRecord>) -> Self {
        let gateway = Self::new();
        {
            let mut store = gateway.lock();
            store
                .sessions
                .extend(records.into_iter().map(|r| (Uuid::new_v4(), r)));
        }
        gateway
    }

    /// Make every `create_session` call fail until switched off
    pub fn fail_sessions(&self, fail: bool) {
        self.lock().fail_sessions = fail;
    }

    /// Make `create_exercise_progress` fail for the named exercise
    pub fn fail_progress_for(&self, exercise: impl Into<String>) {
        self.lock().fail_progress_for.insert(exercise.into());
    }

    /// Number of `create_session` calls, successful or not
    pub fn session_attempts(&self) -> usize {
        self.lock().session_attempts
    }

    pub fn sessions(&self) -> Vec<(SessionId, SessionRecord)> {
        self.lock().sessions.clone()
    }

    pub fn progress_rows(&self) -> Vec<(SessionId, ExerciseEntry)> {
        self.lock().progress.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A poisoned store still holds consistent data; each write is a single push.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionGateway for InMemoryGateway {
    async fn create_session(&self, record: &SessionRecord) -> GatewayResult<SessionId> {
        let mut store = self.lock();
        store.session_attempts += 1;

        if store.fail_sessions {
            return Err(GatewayError::Unavailable("session store offline".into()));
        }

        let id = Uuid::new_v4();
        store.sessions.push((id, record.clone()));
        tracing::debug!("Stored session {} in memory", id);
        Ok(id)
    }

    async fn create_exercise_progress(
        &self,
        session_id: SessionId,
        exercise: &ExerciseEntry,
    ) -> GatewayResult<()> {
        let mut store = self.lock();

        if store.fail_progress_for.contains(&exercise.name) {
            return Err(GatewayError::Rejected(format!(
                "progress row for '{}' refused",
                exercise.name
            )));
        }
        if !store.sessions.iter().any(|(id, _)| *id == session_id) {
            return Err(GatewayError::Rejected(format!("unknown session {}", session_id)));
        }

        store.progress.push((session_id, exercise.clone()));
        Ok(())
    }

    async fn query_sessions(
        &self,
        trainee: &TraineeId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> GatewayResult<Vec<SessionRecord>> {
        let store = self.lock();
        Ok(store
            .sessions
            .iter()
            .map(|(_, r)| r)
            .filter(|r| &r.trainee == trainee && r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }
}
