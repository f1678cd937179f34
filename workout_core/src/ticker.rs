//! Periodic tick driver for the rest timer.
//!
//! The engine's rest timer only moves when something ticks it. This module
//! supplies that something for async hosts: a tokio task that ticks a shared
//! engine once per period and reports what happened. The task stops on its
//! own when the countdown completes or its ticket goes stale, and can be
//! stopped early through its [`RestTickerHandle`].

use crate::engine::WorkoutEngine;
use crate::gateway::SessionGateway;
use crate::rest_timer::{RestTicket, RestTick};
use crate::TraineeId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Engine shared between the driver and ticker tasks
pub type SharedEngine<G> = Arc<Mutex<WorkoutEngine<G>>>;

/// Progress reported by a ticker task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestEvent {
    /// Seconds left after this tick
    Tick(u32),
    /// Rest is over. Emitted at most once per ticker.
    Complete,
}

/// Owner of a running ticker task. Dropping it stops the task.
#[derive(Debug)]
pub struct RestTickerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RestTickerHandle {
    /// Stop the task; no further events are reported
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the task to exit
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RestTickerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Tick `trainee`'s rest countdown identified by `ticket` every `period`
pub fn spawn_rest_ticker<G, F>(
    engine: SharedEngine<G>,
    trainee: TraineeId,
    ticket: RestTicket,
    period: Duration,
    mut on_event: F,
) -> RestTickerHandle
where
    G: SessionGateway + 'static,
    F: FnMut(RestEvent) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    tracing::debug!("Rest ticker for {} cancelled", trainee);
                    return;
                }
                _ = interval.tick() => {}
            }

            let tick = {
                let mut engine = engine.lock().await;
                if cancelled.is_cancelled() {
                    return;
                }
                engine.tick_rest(&trainee, ticket)
            };

            match tick {
                RestTick::Remaining(left) => on_event(RestEvent::Tick(left)),
                RestTick::Completed => {
                    on_event(RestEvent::Complete);
                    return;
                }
                RestTick::Inactive => {
                    tracing::debug!(
                        "Rest ticker for {} stopping: generation {} no longer current",
                        trainee,
                        ticket.generation()
                    );
                    return;
                }
            }
        }
    });

    RestTickerHandle {
        token,
        task: Some(task),
    }
}
