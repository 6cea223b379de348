//! Sliding-window rate limiting keyed by client address
//!
//! The limiter keeps, per key, the instants of the requests accepted within
//! the trailing window. A background sweeper prunes idle keys so abandoned
//! clients do not accumulate.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use link_common::{AppError, RateLimitConfig};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::extractors::client_ip;
use crate::response::ApiError;
use crate::state::AppState;

/// Sliding-window limiter guarded by a single reader/writer lock
pub struct SlidingWindowLimiter {
    requests: RwLock<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
    sweep_interval: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
            max_requests,
            window,
            sweep_interval: window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window()).with_sweep_interval(config.sweep_interval())
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Record a request for `key` if the window still has room.
    ///
    /// Rejected requests are not recorded.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.write();
        let times = requests.entry(key.to_string()).or_default();

        prune(times, now, self.window);

        if times.len() >= self.max_requests {
            return false;
        }

        times.push_back(now);
        true
    }

    /// Prune every key and drop the ones left empty; returns the number dropped
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut requests = self.requests.write();
        let before = requests.len();

        requests.retain(|_, times| {
            prune(times, now, self.window);
            !times.is_empty()
        });

        before - requests.len()
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.requests.read().len()
    }

    /// Spawn the periodic sweep task
    pub fn start_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let limiter = Arc::clone(self);
        let period = self.sweep_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep();
                        debug!(removed, remaining = limiter.tracked_keys(), "Rate limiter sweep");
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Entries are ordered, so expired instants sit at the front
fn prune(times: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while times
        .front()
        .is_some_and(|t| now.duration_since(*t) >= window)
    {
        times.pop_front();
    }
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

/// Handle to the background sweep task
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper and wait for it to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Rate limiter sweeper ended abnormally");
        }
    }
}

/// Reject the request with 429 once the caller's window is full
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let limiter = state.rate_limiter();
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config().http.trust_proxy_headers,
    );

    if limiter.allow(&ip) {
        return next.run(request).await;
    }

    warn!(client_ip = %ip, path = %request.uri().path(), "Rate limit exceeded");

    let mut response = ApiError::App(AppError::RateLimitExceeded).into_response();
    response.headers_mut().insert(
        header::RETRY_AFTER,
        HeaderValue::from(limiter.window().as_secs()),
    );
    response
}
