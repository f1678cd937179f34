//! Persistence gateway contract.
//!
//! The engine never talks to storage directly. It writes finished sessions
//! and their per-exercise progress rows through [`SessionGateway`] and reads
//! history back for statistics. Backends live behind this trait: the
//! in-memory store in [`crate::memory_gateway`] and the JSON Lines journal in
//! [`crate::journal`].

use crate::{ExerciseEntry, SessionId, SessionRecord, TraineeId};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Errors reported by a gateway backend
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Backend could not be reached; the same call may succeed later
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    /// Backend refused the write
    #[error("Write rejected: {0}")]
    Rejected(String),
    /// Local storage failure (file IO, encoding)
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, GatewayError>`.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Store a finished session and return its id
    async fn create_session(&self, record: &SessionRecord) -> GatewayResult<SessionId>;

    /// Store one exercise's detail row for a stored session
    async fn create_exercise_progress(
        &self,
        session_id: SessionId,
        exercise: &ExerciseEntry,
    ) -> GatewayResult<()>;

    /// Sessions for `trainee` dated within `from..=to`
    async fn query_sessions(
        &self,
        trainee: &TraineeId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> GatewayResult<Vec<SessionRecord>>;
}
