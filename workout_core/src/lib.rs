#![forbid(unsafe_code)]

//! Core domain model and business logic for the coach workout engine.
//!
//! This crate provides:
//! - Domain types (plans, exercise entries, set records, session records)
//! - The session state machine and per-trainee engine
//! - Rest timer and its async tick driver
//! - Persistence gateway contract (in-memory and JSONL journal backends)
//! - Statistics (streak, weekly volume, totals, consistency)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod gateway;
pub mod memory_gateway;
pub mod journal;
pub mod export;
pub mod rest_timer;
pub mod session;
pub mod engine;
pub mod ticker;
pub mod history;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, load_plan, Catalog};
pub use config::Config;
pub use gateway::{GatewayError, GatewayResult, SessionGateway};
pub use memory_gateway::InMemoryGateway;
pub use journal::JournalGateway;
pub use rest_timer::{RestTicket, RestTick, RestTimer};
pub use session::{LoggedSet, Session, SessionSummary, StartedRest};
pub use engine::{FinishReport, ProgressFailure, WorkoutEngine};
pub use ticker::{spawn_rest_ticker, RestEvent, RestTickerHandle, SharedEngine};
pub use stats::{StatsSnapshot, StatsWindow};
