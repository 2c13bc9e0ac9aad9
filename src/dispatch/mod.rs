//! Bounded-concurrency execution of request batches.
//!
//! Every request of a batch runs on its own task. A semaphore sized to the
//! effective concurrency is the only gate: a task waits for a permit, executes
//! its request, and drops the permit. Join handles are awaited in input
//! order, so the outcome at index `i` always belongs to request `i`.
mod limits;


use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{AppResult, ExecError};
use crate::http::{Outcome, Request, execute};

pub use limits::{
    ClampReason, ConcurrencyLimit, DEFAULT_HEADROOM_PERCENT, OpenFileLimit, ProcessLimits,
    ResourceLimits, StaticLimits, allowed_concurrency,
};

use limits::clamp_concurrency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Share of the soft open-file ceiling, in percent, usable by one batch.
    pub headroom_percent: u8,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            headroom_percent: DEFAULT_HEADROOM_PERCENT,
        }
    }
}

/// Outcomes of a batch, index-aligned with the submitted requests.
#[derive(Debug)]
pub struct Dispatch {
    pub outcomes: Vec<Outcome>,
    pub limit: ConcurrencyLimit,
    pub elapsed: Duration,
}

impl Dispatch {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len().saturating_sub(self.succeeded())
    }
}

pub struct Dispatcher {
    settings: DispatchSettings,
    limits: Arc<dyn ResourceLimits>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchSettings::default())
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(settings: DispatchSettings) -> Self {
        if !(1..=100).contains(&settings.headroom_percent) {
            warn!(
                "Headroom {}% is outside 1..=100, it will be clamped.",
                settings.headroom_percent
            );
        }
        Self {
            settings,
            limits: Arc::new(ProcessLimits),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Arc<dyn ResourceLimits>) -> Self {
        self.limits = limits;
        self
    }

    /// Resolves the concurrency that will actually be enforced for `requested`.
    #[must_use]
    pub fn effective_limit(&self, requested: usize) -> ConcurrencyLimit {
        let ceiling = match self.limits.open_files() {
            Ok(limit) => Some(limit.soft),
            Err(err) => {
                warn!(
                    "Could not read the open-file limit ({}); running {} requests at a time unchecked.",
                    err, requested
                );
                None
            }
        };
        let limit = clamp_concurrency(requested, ceiling, self.settings.headroom_percent);
        match limit.clamped {
            Some(ClampReason::Zero) => {
                warn!("Concurrency 0 requested, using 1.");
            }
            Some(ClampReason::ResourceCeiling { ceiling, allowed }) => {
                warn!(
                    "Concurrency {} exceeds {}% of the open-file limit {}, clamping to {}.",
                    requested, self.settings.headroom_percent, ceiling, allowed
                );
            }
            None => {}
        }
        limit
    }

    /// Runs every request with at most the effective concurrency in flight.
    ///
    /// A failing request only affects its own outcome; the batch always
    /// completes.
    pub async fn run_all(&self, requests: &[Request], requested: usize) -> Dispatch {
        let limit = self.effective_limit(requested);
        let start = Instant::now();
        let gate = Arc::new(Semaphore::new(limit.effective.min(Semaphore::MAX_PERMITS)));

        let handles: Vec<_> = requests
            .iter()
            .map(|request| {
                let gate = Arc::clone(&gate);
                let request = request.clone();
                tokio::spawn(async move {
                    let Ok(_permit) = gate.acquire_owned().await else {
                        return Outcome::failure(
                            ExecError::GateClosed {
                                url: request.target().as_str().to_owned(),
                            },
                            Duration::ZERO,
                        );
                    };
                    execute(&request).await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (handle, request) in handles.into_iter().zip(requests) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Outcome::failure(
                    ExecError::Aborted {
                        url: request.target().as_str().to_owned(),
                        source: err,
                    },
                    start.elapsed(),
                ),
            };
            outcomes.push(outcome);
        }

        let dispatch = Dispatch {
            outcomes,
            limit,
            elapsed: start.elapsed(),
        };
        info!(
            "Dispatched {} requests ({} ok, {} failed) with concurrency {} in {:?}",
            requests.len(),
            dispatch.succeeded(),
            dispatch.failed(),
            limit.effective,
            dispatch.elapsed
        );
        dispatch
    }
}

/// Runs `requests` with the default dispatcher.
pub async fn dispatch(requests: &[Request], concurrency: usize) -> Dispatch {
    Dispatcher::default().run_all(requests, concurrency).await
}

/// Blocking form of [`dispatch`] that drives its own multi-thread runtime.
///
/// Must not be called from inside an async context.
///
/// # Errors
///
/// Returns an error when the runtime cannot be created.
pub fn dispatch_blocking(requests: &[Request], concurrency: usize) -> AppResult<Dispatch> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(dispatch(requests, concurrency)))
}
