//! Data loader and the recurring poll task.
//!
//! The loader owns the shared [`MonitorState`]. Each refresh fetches the trade
//! records and the health snapshot independently:
//!
//! - a failed trade fetch sets the error message and keeps the previous
//!   records on display;
//! - a failed health fetch is only logged and keeps the previous snapshot.
//!
//! Refreshes are single-flight: a refresh requested while another is running
//! is skipped, so a manual retry never overlaps a timer tick.

use crate::client::MonitorClient;
use crate::types::{HealthSnapshot, TradeRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Everything the dashboard renders from.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Latest successfully fetched records.
    pub records: Arc<Vec<TradeRecord>>,
    /// Latest successfully fetched health snapshot.
    pub health: Option<HealthSnapshot>,
    /// Reason of the last failed trade fetch, cleared on success.
    pub error: Option<String>,
    /// True while a refresh is running.
    pub loading: bool,
    /// Time of the last successful trade fetch.
    pub last_update: Option<DateTime<Utc>>,
}

/// Result of a single refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Records were replaced.
    Updated {
        /// Number of records received.
        records: usize,
    },
    /// The trade fetch failed; previous records were kept.
    Failed(String),
    /// Another refresh was already running.
    Skipped,
}

/// Clears the in-flight flag and loading state even if the refresh future
/// is dropped mid-flight.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    state: &'a RwLock<MonitorState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.write().loading = false;
        self.flag.store(false, Ordering::Release);
    }
}

/// Fetches backend data into a shared [`MonitorState`].
#[derive(Debug, Clone)]
pub struct DataLoader {
    client: MonitorClient,
    state: Arc<RwLock<MonitorState>>,
    in_flight: Arc<AtomicBool>,
}

impl DataLoader {
    /// Creates a loader with an empty state.
    #[must_use]
    pub fn new(client: MonitorClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(MonitorState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> MonitorState {
        self.state.read().clone()
    }

    /// Returns the shared state handle.
    #[must_use]
    pub fn shared_state(&self) -> Arc<RwLock<MonitorState>> {
        Arc::clone(&self.state)
    }

    /// Fetches records and health once. Also serves as the manual retry.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlight {
            flag: &self.in_flight,
            state: &self.state,
        };
        self.state.write().loading = true;

        let (options, health) = tokio::join!(self.client.get_options(), self.client.get_health());

        let outcome = match options {
            Ok(payload) => {
                let count = payload.data.len();
                let malformed = payload
                    .data
                    .iter()
                    .filter(|r| r.has_malformed_volume())
                    .count();
                if malformed > 0 {
                    debug!("{} of {} records have a non-numeric volume", malformed, count);
                }

                let mut state = self.state.write();
                state.records = Arc::new(payload.data);
                state.last_update = Some(Utc::now());
                state.error = None;
                debug!("loaded {} records", count);
                RefreshOutcome::Updated { records: count }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Error loading data: {}", message);
                self.state.write().error = Some(message.clone());
                RefreshOutcome::Failed(message)
            }
        };

        match health {
            Ok(snapshot) => self.state.write().health = Some(snapshot),
            Err(e) => warn!("Error fetching health: {}", e),
        }

        outcome
    }
}

/// Runs [`DataLoader::refresh`] immediately and then on a fixed period.
pub struct Poller;

impl Poller {
    /// Spawns the poll task on the current tokio runtime.
    #[must_use]
    pub fn spawn(loader: DataLoader, period: Duration) -> PollerHandle {
        let period = period.max(Duration::from_millis(1));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            info!("Polling every {:?}", period);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = loader.refresh() => {}
                }
            }
            debug!("poller stopped");
        });

        PollerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running poll task. Dropping it also stops the task.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancels the timer and waits for the task to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("poller task ended abnormally: {}", e);
        }
    }
}
