//! JSON Lines journal gateway.
//!
//! Sessions and exercise progress rows are appended to two JSONL files
//! under the data directory, each write under an exclusive file lock so
//! several `coach` processes can share one journal. Reads take a shared lock
//! and skip lines that fail to parse.

use crate::gateway::{GatewayError, GatewayResult, SessionGateway};
use crate::{ExerciseEntry, Result, SessionId, SessionRecord, TraineeId};
use async_trait::async_trait;
use chrono::NaiveDate;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SESSIONS_FILE: &str = "sessions.jsonl";
const PROGRESS_FILE: &str = "progress.jsonl";

/// One line of `sessions.jsonl`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub id: SessionId,
    #[serde(flatten)]
    pub record: SessionRecord,
}

/// One line of `progress.jsonl`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredProgress {
    pub session_id: SessionId,
    pub exercise: ExerciseEntry,
}

/// File-backed gateway rooted at a data directory
#[derive(Clone, Debug)]
pub struct JournalGateway {
    dir: PathBuf,
}

impl JournalGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join(SESSIONS_FILE)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.join(PROGRESS_FILE)
    }

    /// Every stored session, in journal order
    pub fn read_all(&self) -> Result<Vec<StoredSession>> {
        read_lines(&self.sessions_path())
    }

    /// Every stored progress row, in journal order
    pub fn read_progress(&self) -> Result<Vec<StoredProgress>> {
        read_lines(&self.progress_path())
    }
}

#[async_trait]
impl SessionGateway for JournalGateway {
    async fn create_session(&self, record: &SessionRecord) -> GatewayResult<SessionId> {
        let stored = StoredSession {
            id: Uuid::new_v4(),
            record: record.clone(),
        };
        let path = self.sessions_path();
        let id = stored.id;

        run_blocking(move || append_line(&path, &stored)).await?;

        tracing::debug!("Appended session {} to journal", id);
        Ok(id)
    }

    async fn create_exercise_progress(
        &self,
        session_id: SessionId,
        exercise: &ExerciseEntry,
    ) -> GatewayResult<()> {
        let stored = StoredProgress {
            session_id,
            exercise: exercise.clone(),
        };
        let path = self.progress_path();

        run_blocking(move || append_line(&path, &stored)).await
    }

    async fn query_sessions(
        &self,
        trainee: &TraineeId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> GatewayResult<Vec<SessionRecord>> {
        let path = self.sessions_path();
        let trainee = trainee.clone();

        run_blocking(move || {
            let stored: Vec<StoredSession> = read_lines(&path)?;
            Ok(stored
                .into_iter()
                .map(|s| s.record)
                .filter(|r| r.trainee == trainee && r.date >= from && r.date <= to)
                .collect())
        })
        .await
    }
}

/// Run journal IO off the async executor, flattening both failure layers
async fn run_blocking<T, F>(f: F) -> GatewayResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GatewayError::Storage(format!("journal task failed: {}", e)))?
        .map_err(|e| GatewayError::Storage(e.to_string()))
}

/// Append one JSON line under an exclusive lock
fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.lock_exclusive()?;

    let mut writer = std::io::BufWriter::new(&file);
    let line = serde_json::to_string(value)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    file.sync_data()?;
    file.unlock()?;
    Ok(())
}

/// Read all parseable JSON lines under a shared lock
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut items = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable line {} in {:?}: {}",
                    line_num + 1,
                    path,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from {:?}", items.len(), path);
    Ok(items)
}
