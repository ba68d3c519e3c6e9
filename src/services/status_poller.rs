//! Background polling of a simulation's status until it settles.
//!
//! Each poll runs in its own task and is controlled through a
//! [`PollHandle`]. The loop issues a status read every interval while
//! active, publishes each result, and stops on its own once the server
//! reports `completed` or `failed`.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::models::{PollerConfig, SimulationStatusResponse};
use crate::domain::ports::SimulationRepository;
use crate::services::cache::{CacheKey, EntityFamily, Invalidation, QueryCache};

/// Base delay between status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Ceiling of the delay after repeated failed reads.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollControl {
    Active,
    Paused,
    Cancelled,
}

/// How a polling task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The server reported a terminal status.
    Terminal(SimulationStatusResponse),
    /// The handle was cancelled or dropped first.
    Cancelled,
}

/// Caller's side of a running poll.
///
/// Dropping the handle cancels the poll.
pub struct PollHandle {
    simulation_id: String,
    control: watch::Sender<PollControl>,
    latest: watch::Receiver<Option<SimulationStatusResponse>>,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    pub fn simulation_id(&self) -> &str {
        &self.simulation_id
    }

    /// Pause or resume polling. Resuming issues a read right away, even when
    /// the pause and resume both land inside one wait between reads.
    pub fn set_active(&self, active: bool) {
        let next = if active {
            PollControl::Active
        } else {
            PollControl::Paused
        };
        self.control.send_if_modified(|state| {
            if *state == PollControl::Cancelled || *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    pub fn is_active(&self) -> bool {
        *self.control.borrow() == PollControl::Active
    }

    /// Most recently observed status, `None` until the first successful read.
    pub fn latest(&self) -> Option<SimulationStatusResponse> {
        self.latest.borrow().clone()
    }

    /// Watch every status the poll observes.
    pub fn subscribe(&self) -> watch::Receiver<Option<SimulationStatusResponse>> {
        self.latest.clone()
    }

    /// Stop polling. An in-flight read is abandoned.
    pub fn cancel(&self) {
        self.control.send_replace(PollControl::Cancelled);
    }

    /// Wait for the polling task to finish.
    pub async fn join(mut self) -> PollOutcome {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(PollOutcome::Cancelled),
            None => PollOutcome::Cancelled,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.control.send_replace(PollControl::Cancelled);
        }
    }
}

/// Spawns status polls against a simulation repository.
pub struct StatusPoller<S: SimulationRepository + 'static> {
    repository: Arc<S>,
    cache: Arc<QueryCache>,
    interval: Duration,
    max_backoff: Duration,
}

impl<S: SimulationRepository + 'static> StatusPoller<S> {
    /// Create a poller with the default 2 second interval.
    pub fn new(repository: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self {
            repository,
            cache,
            interval: DEFAULT_POLL_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn with_config(repository: Arc<S>, cache: Arc<QueryCache>, config: &PollerConfig) -> Self {
        let interval = Duration::from_millis(config.interval_ms);
        Self {
            repository,
            cache,
            interval,
            max_backoff: Duration::from_millis(config.max_backoff_ms).max(interval),
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `simulation_id`, calling `on_update` with every status read.
    ///
    /// The first read is issued immediately. Must be called within a tokio runtime.
    pub fn start_polling<F>(&self, simulation_id: impl Into<String>, on_update: F) -> PollHandle
    where
        F: FnMut(&SimulationStatusResponse) + Send + 'static,
    {
        let simulation_id = simulation_id.into();
        let (control_tx, control_rx) = watch::channel(PollControl::Active);
        let (latest_tx, latest_rx) = watch::channel(None);

        let poll = PollLoop {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            simulation_id: simulation_id.clone(),
            interval: self.interval,
            backoff: failure_backoff(self.interval, self.max_backoff),
            control: control_rx,
            latest: latest_tx,
        };
        let task = tokio::spawn(poll.run(on_update));

        PollHandle {
            simulation_id,
            control: control_tx,
            latest: latest_rx,
            task: Some(task),
        }
    }
}

/// Doubling delay after failed reads, no jitter and no overall time limit.
fn failure_backoff(interval: Duration, max_backoff: Duration) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(interval)
        .with_randomization_factor(0.0)
        .with_multiplier(2.0)
        .with_max_interval(max_backoff)
        .with_max_elapsed_time(None)
        .build()
}

struct PollLoop<S: SimulationRepository> {
    repository: Arc<S>,
    cache: Arc<QueryCache>,
    simulation_id: String,
    interval: Duration,
    backoff: ExponentialBackoff,
    control: watch::Receiver<PollControl>,
    latest: watch::Sender<Option<SimulationStatusResponse>>,
}

impl<S: SimulationRepository> PollLoop<S> {
    async fn run<F>(mut self, mut on_update: F) -> PollOutcome
    where
        F: FnMut(&SimulationStatusResponse),
    {
        debug!(simulation_id = %self.simulation_id, "status polling started");

        loop {
            if !self.wait_until_active().await {
                return self.cancelled();
            }

            let fetched = tokio::select! {
                result = self.repository.status(&self.simulation_id) => result,
                () = wait_for_cancel(&mut self.control) => return self.cancelled(),
            };

            let delay = match fetched {
                Ok(status) => {
                    self.backoff.reset();
                    self.cache
                        .put(CacheKey::status(self.simulation_id.clone()), &status)
                        .await;
                    on_update(&status);
                    self.latest.send_replace(Some(status.clone()));

                    if status.is_terminal() {
                        self.cache
                            .invalidate(&Invalidation::Entity(
                                EntityFamily::Simulations,
                                self.simulation_id.clone(),
                            ))
                            .await;
                        self.cache
                            .invalidate(&Invalidation::List(EntityFamily::Simulations))
                            .await;
                        info!(
                            simulation_id = %self.simulation_id,
                            status = %status.status,
                            "simulation reached terminal status, polling stopped"
                        );
                        return PollOutcome::Terminal(status);
                    }
                    self.interval
                }
                Err(error) => {
                    // Permanent failures (404, validation) go straight to the ceiling.
                    let transient = error.is_transient();
                    let delay = if transient {
                        self.backoff.next_backoff().unwrap_or(self.backoff.max_interval)
                    } else {
                        self.backoff.max_interval
                    };
                    warn!(
                        simulation_id = %self.simulation_id,
                        error = %error,
                        transient,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "status read failed, keeping last known status"
                    );
                    delay
                }
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                resumed = wait_for_resume(&mut self.control) => {
                    if !resumed {
                        return self.cancelled();
                    }
                    debug!(simulation_id = %self.simulation_id, "polling resumed, reading now");
                }
            }
        }
    }

    /// Block while paused. Returns `false` once cancelled.
    async fn wait_until_active(&mut self) -> bool {
        loop {
            match *self.control.borrow_and_update() {
                PollControl::Active => return true,
                PollControl::Cancelled => return false,
                PollControl::Paused => {}
            }
            if self.control.changed().await.is_err() {
                return false;
            }
        }
    }

    fn cancelled(&self) -> PollOutcome {
        debug!(simulation_id = %self.simulation_id, "status polling cancelled");
        PollOutcome::Cancelled
    }
}

/// Resolves once the handle cancels or goes away; pause/resume are ignored.
async fn wait_for_cancel(control: &mut watch::Receiver<PollControl>) {
    loop {
        if *control.borrow_and_update() == PollControl::Cancelled {
            return;
        }
        if control.changed().await.is_err() {
            return;
        }
    }
}

/// Resolves `true` when a pause is followed by a resume, `false` once
/// cancelled or the handle is gone.
async fn wait_for_resume(control: &mut watch::Receiver<PollControl>) -> bool {
    let mut paused = false;
    loop {
        match *control.borrow_and_update() {
            PollControl::Cancelled => return false,
            PollControl::Paused => paused = true,
            PollControl::Active if paused => return true,
            PollControl::Active => {}
        }
        if control.changed().await.is_err() {
            return false;
        }
    }
}
