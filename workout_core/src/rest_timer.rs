//! Countdown between sets.
//!
//! The timer never reads a clock. The host (CLI ticker task, test harness)
//! advances it one unit at a time with [`RestTimer::tick`] or
//! [`RestTimer::tick_ticket`]. Every `start` bumps a generation counter and
//! hands out a [`RestTicket`]; ticks carrying an old ticket are ignored, so a
//! replaced or cancelled countdown can never fire.

use crate::{Error, Result};

/// Identifies one particular countdown started on a timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RestTicket(u64);

impl RestTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What a single tick did to the timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestTick {
    /// Still counting; carries the seconds left
    Remaining(u32),
    /// Reached zero on this tick. Reported once per `start`.
    Completed,
    /// Nothing running, or the ticket belongs to a replaced countdown
    Inactive,
}

/// Single-instance cancellable countdown
#[derive(Clone, Debug, Default)]
pub struct RestTimer {
    remaining: u32,
    running: bool,
    generation: u64,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown of `seconds`, replacing any countdown in progress
    pub fn start(&mut self, seconds: u32) -> Result<RestTicket> {
        if seconds == 0 {
            return Err(Error::InvalidRest);
        }

        if self.running {
            tracing::debug!(
                "Replacing rest timer with {}s left (generation {})",
                self.remaining,
                self.generation
            );
        }

        self.generation += 1;
        self.remaining = seconds;
        self.running = true;

        tracing::debug!("Rest timer started: {}s (generation {})", seconds, self.generation);
        Ok(RestTicket(self.generation))
    }

    /// Advance the running countdown by one unit
    pub fn tick(&mut self) -> RestTick {
        if !self.running {
            return RestTick::Inactive;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            tracing::debug!("Rest complete (generation {})", self.generation);
            RestTick::Completed
        } else {
            RestTick::Remaining(self.remaining)
        }
    }

    /// Advance only if `ticket` still names the running countdown
    pub fn tick_ticket(&mut self, ticket: RestTicket) -> RestTick {
        if !self.is_current(ticket) {
            return RestTick::Inactive;
        }
        self.tick()
    }

    /// Stop and discard the remaining time. Safe to call when idle.
    pub fn cancel(&mut self) {
        if self.running {
            tracing::debug!(
                "Rest timer cancelled with {}s left (generation {})",
                self.remaining,
                self.generation
            );
        }
        self.running = false;
        self.remaining = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        if self.running {
            self.remaining
        } else {
            0
        }
    }

    /// True when `ticket` was issued by the countdown currently running
    pub fn is_current(&self, ticket: RestTicket) -> bool {
        self.running && ticket.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_and_completes_once() {
        let mut timer = RestTimer::new();
        timer.start(3).unwrap();

        assert_eq!(timer.tick(), RestTick::Remaining(2));
        assert_eq!(timer.tick(), RestTick::Remaining(1));
        assert_eq!(timer.tick(), RestTick::Completed);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), RestTick::Inactive);
        assert_eq!(timer.tick(), RestTick::Inactive);
    }

    #[test]
    fn test_zero_seconds_rejected() {
        let mut timer = RestTimer::new();
        assert!(matches!(timer.start(0), Err(Error::InvalidRest)));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = RestTimer::new();
        timer.cancel();

        timer.start(10).unwrap();
        timer.cancel();
        timer.cancel();

        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.tick(), RestTick::Inactive);
    }

    #[test]
    fn test_restart_replaces_countdown() {
        let mut timer = RestTimer::new();
        let first = timer.start(2).unwrap();
        timer.tick();

        let second = timer.start(2).unwrap();
        assert_ne!(first, second);
        assert_eq!(timer.remaining(), 2);

        // The old ticket no longer reaches the timer
        assert_eq!(timer.tick_ticket(first), RestTick::Inactive);
        assert_eq!(timer.remaining(), 2);

        assert_eq!(timer.tick_ticket(second), RestTick::Remaining(1));
        assert_eq!(timer.tick_ticket(second), RestTick::Completed);
    }

    #[test]
    fn test_single_completion_per_start() {
        let mut timer = RestTimer::new();
        let first = timer.start(1).unwrap();
        let second = timer.start(1).unwrap();

        let completions = [
            timer.tick_ticket(first),
            timer.tick_ticket(second),
            timer.tick_ticket(first),
            timer.tick_ticket(second),
        ]
        .iter()
        .filter(|t| **t == RestTick::Completed)
        .count();

        assert_eq!(completions, 1);
    }
}
