//! Error types for the workout_core library.

use crate::gateway::GatewayError;
use crate::types::TraineeId;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
///
/// Usage errors are caller mistakes against the session contract and are
/// never retried. `Persistence` wraps a failed gateway write and leaves the
/// session untouched so the caller can retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A workout plan with no exercises was passed to `start`
    #[error("Workout plan has no exercises")]
    EmptyPlan,

    /// A plan item carries an impossible prescription
    #[error("Invalid workout plan: {0}")]
    InvalidPlan(String),

    /// The trainee already has a session in progress
    #[error("Trainee {0} already has an active session")]
    SessionAlreadyActive(TraineeId),

    /// The operation needs an active session and there is none
    #[error("Trainee {0} has no active session")]
    NoActiveSession(TraineeId),

    /// Weight or repetition count out of range
    #[error("Invalid set: {0}")]
    InvalidSet(String),

    /// Feeling tag not one of the known values
    #[error("Unknown feeling '{0}', expected great, good, normal, tired or bad")]
    UnknownFeeling(String),

    /// Advance requested on the last exercise; the session must be finished
    #[error("Already at the last exercise, finish the session instead")]
    NoNextExercise,

    /// Rest timer started with a zero duration
    #[error("Rest timer needs a positive duration")]
    InvalidRest,

    /// Gateway write or query failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] GatewayError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan catalog lookup or validation error
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl Error {
    /// True for caller misuse of the session operations
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::EmptyPlan
                | Error::InvalidPlan(_)
                | Error::SessionAlreadyActive(_)
                | Error::NoActiveSession(_)
                | Error::InvalidSet(_)
                | Error::UnknownFeeling(_)
                | Error::NoNextExercise
                | Error::InvalidRest
        )
    }

    /// True when repeating the same call may succeed (the backend was down)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}
