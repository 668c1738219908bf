use crate::display::Dashboard;
use crate::render::render_snapshot;
use crate::snapshot::Snapshot;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Rendered,
    Failed,
    /// A previous poll was still in flight; nothing was touched.
    Skipped,
}

pub struct Poller<D: Dashboard> {
    client: Client,
    endpoint: String,
    timeout: Duration,
    dashboard: Arc<Mutex<D>>,
    in_flight: AtomicBool,
}

impl<D: Dashboard> Poller<D> {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        timeout: Duration,
        dashboard: Arc<Mutex<D>>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            dashboard,
            in_flight: AtomicBool::new(false),
        }
    }

    /// One fetch-and-render cycle. Failures are logged and swallowed; the
    /// outcome is only informational.
    pub async fn poll_and_render(&self) -> PollOutcome {
        let Some(_flight) = InFlight::acquire(&self.in_flight) else {
            debug!(endpoint = %self.endpoint, "previous poll still in flight, skipping tick");
            return PollOutcome::Skipped;
        };
        let _busy = Busy::show(&self.dashboard);

        let start = Instant::now();
        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                let mut dash = lock(&self.dashboard);
                render_snapshot(&snapshot, &mut *dash);
                if let Err(err) = dash.commit() {
                    warn!(error = %err, "failed to draw dashboard");
                }
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    processes = snapshot.processes.len(),
                    "snapshot rendered"
                );
                PollOutcome::Rendered
            }
            Err(err) => {
                error!(error = %err, endpoint = %self.endpoint, "Error fetching system info");
                PollOutcome::Failed
            }
        }
    }

    pub async fn fetch_snapshot(&self) -> Result<Snapshot, PollError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PollError::Status(status));
        }
        let body = resp.bytes().await?;
        Ok(Snapshot::from_slice(&body)?)
    }
}

fn lock<D>(dashboard: &Mutex<D>) -> MutexGuard<'_, D> {
    // A panic mid-render leaves stale text, never an invalid dashboard.
    dashboard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Held for the duration of one poll; a second acquire fails until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shows the busy indicator on creation and hides it on every exit path.
struct Busy<'a, D: Dashboard>(&'a Mutex<D>);

impl<'a, D: Dashboard> Busy<'a, D> {
    fn show(dashboard: &'a Mutex<D>) -> Self {
        set_busy(dashboard, true);
        Self(dashboard)
    }
}

impl<D: Dashboard> Drop for Busy<'_, D> {
    fn drop(&mut self) {
        set_busy(self.0, false);
    }
}

fn set_busy<D: Dashboard>(dashboard: &Mutex<D>, busy: bool) {
    let mut dash = lock(dashboard);
    dash.set_busy(busy);
    if let Err(err) = dash.commit() {
        warn!(error = %err, "failed to draw dashboard");
    }
}
