//! Driving a remote run from submission to a terminal state.
//!
//! Polling is an explicit loop over a [`RunBackend`] and a [`Scheduler`]:
//! each round is one status request, followed by a sleep that a
//! [`CancelToken`] can cut short. The client enforces its own max-wait
//! ceiling, measured from submission, so a run that never leaves
//! `running` cannot hang the caller.

use futures::future::try_join_all;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

use super::{RunBackend, RunState, RunStatus};
use crate::error::{Result, VibeError};
use crate::results::EvalResult;
use crate::suite::EvalSuite;

/// Default delay between status polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default client-side ceiling on how long to wait for a run
pub const DEFAULT_MAX_WAIT_SECONDS: u64 = 600;

/// Floor on the delay between polls; shorter intervals are raised to it
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Time source and timer used by the poll loop.
pub trait Scheduler {
    /// Monotonic time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall-clock scheduler backed by the tokio timer.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    origin: tokio::time::Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Virtual clock: sleeping advances time instantly.
///
/// Lets poll loops, ceilings and cancellation be exercised without
/// waiting on real timers. There is a single clock: when several poll
/// loops share one scheduler, every loop's sleep moves it, so each loop
/// sees roughly N times the elapsed time it would see alone.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.advance(duration);
        std::future::ready(())
    }
}

impl<S: Scheduler> Scheduler for Arc<S> {
    fn now(&self) -> Duration {
        self.as_ref().now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.as_ref().sleep(duration)
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation flag shared between a waiter and a trigger.
///
/// Cancelling never aborts a request already on the wire; the poll loop
/// notices at its next suspend point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancelToken::cancel`] has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECONDS),
        }
    }
}

/// A finished run and its results.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: String,
    pub state: RunState,
    pub results: Vec<EvalResult>,
}

pub struct RunLifecycle<B, S> {
    backend: B,
    scheduler: S,
    options: PollOptions,
    cancel: CancelToken,
    in_flight: Mutex<Vec<String>>,
}

impl<B: RunBackend, S: Scheduler> RunLifecycle<B, S> {
    pub fn new(backend: B, scheduler: S, options: PollOptions) -> Self {
        Self {
            backend,
            scheduler,
            options,
            cancel: CancelToken::new(),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Runs submitted by this lifecycle that have not reached a terminal state.
    pub fn in_flight(&self) -> Vec<String> {
        self.in_flight
            .lock()
            .map(|runs| runs.clone())
            .unwrap_or_default()
    }

    /// Submit a suite and wait for it; the ceiling counts from submission.
    pub async fn run_suite(&self, suite: &EvalSuite, yaml: Option<&str>) -> Result<RunOutcome> {
        let started = self.scheduler.now();
        let run_id = self.backend.submit(suite, yaml).await?;
        debug!(run_id = %run_id, model = %suite.metadata.model, "submitted");

        self.track(&run_id);
        let outcome = self.wait_from(&run_id, started).await;
        if has_settled(&outcome) {
            self.untrack(&run_id);
        }

        outcome
    }

    /// Poll an already submitted run until it settles.
    pub async fn wait_for_completion(&self, run_id: &str) -> Result<Vec<EvalResult>> {
        let started = self.scheduler.now();
        Ok(self.wait_from(run_id, started).await?.results)
    }

    /// Run the suite once per model, concurrently.
    ///
    /// Results are concatenated in `models` order regardless of which run
    /// finishes first, and each result is stamped with its model. The
    /// YAML source is not forwarded since it names the original model.
    ///
    /// The first pipeline to fail ends the fan-out with its error; the
    /// other waits are dropped and their runs stay in [`Self::in_flight`].
    pub async fn run_models(&self, suite: &EvalSuite, models: &[String]) -> Result<Vec<EvalResult>> {
        let pipelines = models.iter().map(|model| async move {
            let variant = suite.with_model(model);
            self.run_suite(&variant, None)
                .await
                .map(|outcome| (model, outcome))
        });

        let mut merged = Vec::new();
        for (model, outcome) in try_join_all(pipelines).await? {
            merged.extend(outcome.results.into_iter().map(|mut result| {
                result.model.get_or_insert_with(|| model.clone());
                result
            }));
        }

        Ok(merged)
    }

    /// Forward a cancellation request to the server.
    pub async fn cancel(&self, run_id: &str) -> Result<()> {
        debug!(run_id = %run_id, "cancel_requested");
        self.backend.cancel(run_id).await
    }

    async fn wait_from(&self, run_id: &str, started: Duration) -> Result<RunOutcome> {
        let PollOptions { interval, max_wait } = self.options;
        let interval = interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS));

        loop {
            if self.cancel.is_cancelled() {
                return Err(VibeError::Interrupted {
                    run_id: run_id.to_string(),
                });
            }

            let status = self.backend.poll(run_id).await?;
            let elapsed = self.scheduler.now().saturating_sub(started);
            debug!(run_id = %run_id, state = %status.status, elapsed = ?elapsed, "poll");

            if let Some(results) = settle(run_id, &status)? {
                return Ok(RunOutcome {
                    run_id: run_id.to_string(),
                    state: status.status,
                    results,
                });
            }

            if elapsed >= max_wait {
                warn!(run_id = %run_id, waited = ?elapsed, "poll_timeout");
                return Err(VibeError::PollTimeout {
                    run_id: run_id.to_string(),
                    waited: elapsed,
                });
            }

            let pause = interval.min(max_wait - elapsed);
            tokio::select! {
                _ = self.scheduler.sleep(pause) => {}
                _ = self.cancel.cancelled() => {}
            }
        }
    }

    fn track(&self, run_id: &str) {
        if let Ok(mut runs) = self.in_flight.lock() {
            runs.push(run_id.to_string());
        }
    }

    fn untrack(&self, run_id: &str) {
        if let Ok(mut runs) = self.in_flight.lock() {
            runs.retain(|r| r != run_id);
        }
    }
}

/// Whether the server has put the run in a terminal state. Interrupted or
/// timed-out waits leave the run live on the server.
fn has_settled(outcome: &Result<RunOutcome>) -> bool {
    matches!(
        outcome,
        Ok(_)
            | Err(VibeError::RunFailed { .. })
            | Err(VibeError::ServerTimedOut { .. })
            | Err(VibeError::RunCancelled { .. })
    )
}

/// Map a status onto the lifecycle: `Some(results)` when finished,
/// `None` while still in progress, an error for failed terminal states.
fn settle(run_id: &str, status: &RunStatus) -> Result<Option<Vec<EvalResult>>> {
    let message = || {
        status
            .error
            .clone()
            .unwrap_or_else(|| "no error message from server".to_string())
    };

    match &status.status {
        RunState::Completed | RunState::PartialFailure => {
            Ok(Some(status.results.clone().unwrap_or_default()))
        }
        RunState::Failed | RunState::Error => {
            warn!(run_id = %run_id, state = %status.status, "run_failed");
            Err(VibeError::RunFailed {
                run_id: run_id.to_string(),
                state: status.status.clone(),
                message: message(),
            })
        }
        RunState::TimedOut => Err(VibeError::ServerTimedOut {
            run_id: run_id.to_string(),
            message: message(),
        }),
        RunState::Cancelled => Err(VibeError::RunCancelled {
            run_id: run_id.to_string(),
        }),
        RunState::Unknown(state) => {
            debug!(run_id = %run_id, state = %state, "unknown_run_state");
            Ok(None)
        }
        RunState::Queued | RunState::Running => Ok(None),
    }
}

#[cfg(test)]
mod tests;
