//! Derived training statistics.
//!
//! Everything here is a pure function over a slice of historical
//! [`SessionRecord`]s and an explicit reference date. Nothing reads the
//! clock and nothing mutates its input. [`fetch_snapshot`] is the only
//! async entry point; it fetches the records through a gateway and then
//! calls the pure functions.

use crate::gateway::SessionGateway;
use crate::{Result, SessionRecord, TraineeId};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 30;
pub const DEFAULT_TARGET_PER_WEEK: u32 = 3;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Upper bound accepted from configuration for any day window
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Length of the trailing volume window, reference day included
const VOLUME_WINDOW_DAYS: u32 = 7;

/// Parameters for a stats computation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsWindow {
    pub window_days: u32,
    pub target_per_week: u32,
    pub max_lookback_days: u32,
}

impl Default for StatsWindow {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            target_per_week: DEFAULT_TARGET_PER_WEEK,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }
}

/// Workout count and total minutes over a set of records
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub workouts: usize,
    pub total_minutes: u64,
}

/// Combined statistics for one window and reference date
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub streak_days: u32,
    pub workouts_in_window: usize,
    pub total_minutes_in_window: u64,
    pub weekly_volume: u64,
    pub consistency_percent: u32,
}

/// Consecutive training days ending at `as_of`
///
/// Walks back one day at a time for at most
/// `min(max_lookback_days, distinct training dates)` days. A missing day
/// ends the streak, except the reference day itself: not having trained
/// yet today keeps yesterday's streak alive without adding to it.
pub fn streak(records: &[SessionRecord], as_of: NaiveDate, max_lookback_days: u32) -> u32 {
    let dates: BTreeSet<NaiveDate> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.date)
        .collect();

    let limit = (max_lookback_days as usize).min(dates.len());
    let mut count = 0;

    for offset in 0..limit {
        let Some(day) = as_of.checked_sub_days(Days::new(offset as u64)) else {
            break;
        };
        if dates.contains(&day) {
            count += 1;
        } else if offset > 0 {
            break;
        }
    }

    count
}

/// Σ weight × reps over records dated within the 7 days ending at `as_of`
pub fn weekly_volume(records: &[SessionRecord], as_of: NaiveDate) -> u64 {
    let start = window_start(as_of, VOLUME_WINDOW_DAYS);

    let volume: f64 = records
        .iter()
        .filter(|r| r.date >= start && r.date <= as_of)
        .map(SessionRecord::volume)
        .sum();

    volume.max(0.0).round() as u64
}

/// Number of workouts and total minutes; bad durations count as zero
pub fn totals(records: &[SessionRecord]) -> Totals {
    Totals {
        workouts: records.len(),
        total_minutes: records.iter().map(SessionRecord::minutes_or_zero).sum(),
    }
}

/// Percentage of the expected session count reached, capped at 100
///
/// Expected sessions are `floor(window_days / 7) × target_per_week`; a
/// window shorter than a week expects nothing and scores 0.
pub fn consistency(records: &[SessionRecord], window_days: u32, target_per_week: u32) -> u32 {
    let expected = u64::from(window_days / 7) * u64::from(target_per_week);
    if expected == 0 {
        return 0;
    }

    let percent = (records.len() as f64 / expected as f64 * 100.0).round();
    percent.min(100.0) as u32
}

/// All statistics for `records`, which should already cover the window
pub fn snapshot(records: &[SessionRecord], as_of: NaiveDate, window: &StatsWindow) -> StatsSnapshot {
    let in_window = records_in_window(records, as_of, window.window_days);
    let totals = totals(&in_window);

    StatsSnapshot {
        streak_days: streak(records, as_of, window.max_lookback_days),
        workouts_in_window: totals.workouts,
        total_minutes_in_window: totals.total_minutes,
        weekly_volume: weekly_volume(records, as_of),
        consistency_percent: consistency(&in_window, window.window_days, window.target_per_week),
    }
}

/// Fetch the trainee's history through the gateway and compute a snapshot
pub async fn fetch_snapshot<G: SessionGateway + ?Sized>(
    gateway: &G,
    trainee: &TraineeId,
    as_of: NaiveDate,
    window: &StatsWindow,
) -> Result<StatsSnapshot> {
    let span = window
        .window_days
        .max(window.max_lookback_days)
        .max(VOLUME_WINDOW_DAYS);
    let from = window_start(as_of, span);

    let records = gateway.query_sessions(trainee, from, as_of).await?;
    tracing::debug!(
        "Computing stats for {} over {} records ({} to {})",
        trainee,
        records.len(),
        from,
        as_of
    );

    Ok(snapshot(&records, as_of, window))
}

/// Records dated within the `window_days` days ending at `as_of`
fn records_in_window(records: &[SessionRecord], as_of: NaiveDate, window_days: u32) -> Vec<SessionRecord> {
    if window_days == 0 {
        return Vec::new();
    }
    let start = window_start(as_of, window_days);
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= as_of)
        .cloned()
        .collect()
}

/// First day of the `days`-long window ending at `as_of`, clamped to the calendar
fn window_start(as_of: NaiveDate, days: u32) -> NaiveDate {
    as_of
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}
