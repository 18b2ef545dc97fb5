use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::types::{RecommendationJob, RecommendationStatus, RecommendedQuestion};
use crate::error::ApiError;

/// Cancellation handle for one polling loop. Cancelling bumps the shared
/// generation, which invalidates every token handed out before it.
#[derive(Clone, Debug)]
pub struct CancelToken {
    shared: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.load(Ordering::SeqCst) != self.generation
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    Ready(Vec<RecommendedQuestion>),
    TimedOut,
    Cancelled,
    Failed(ApiError),
}

/// A bounded status-polling loop for one recommendation job.
#[derive(Clone, Debug)]
pub struct PollTask {
    pub rec_id: String,
    pub policy: PollPolicy,
    pub cancel: CancelToken,
}

impl PollTask {
    /// Check, then wait, up to `max_attempts` times. Cancellation is
    /// observed before each attempt; a check already in flight always
    /// finishes.
    pub fn run(
        &self,
        mut check: impl FnMut(&str) -> Result<RecommendationStatus, ApiError>,
        mut sleep: impl FnMut(Duration),
        mut progress: impl FnMut(u32),
    ) -> PollOutcome {
        let max = self.policy.max_attempts;
        for attempt in 1..=max {
            if self.cancel.is_cancelled() {
                debug!(rec_id = %self.rec_id, attempt, "poll cancelled");
                return PollOutcome::Cancelled;
            }
            progress(attempt);
            match check(&self.rec_id) {
                Ok(status) if status.success => {
                    info!(rec_id = %self.rec_id, attempt, count = status.recommendation.len(), "recommendations ready");
                    return PollOutcome::Ready(status.recommendation);
                }
                Ok(_) => debug!(rec_id = %self.rec_id, attempt, "recommendations pending"),
                Err(e) if e.is_unauthenticated() => return PollOutcome::Failed(e),
                Err(e) => warn!(rec_id = %self.rec_id, attempt, error = %e, "poll attempt failed"),
            }
            if attempt < max {
                sleep(self.policy.interval);
            }
        }
        info!(rec_id = %self.rec_id, max, "recommendation polling timed out");
        PollOutcome::TimedOut
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Requesting,
    Polling { rec_id: String, attempt: u32 },
    Ready,
    TimedOut,
}

/// Tracks the single active recommendation job for the view.
pub struct RecommendationPoller {
    state: PollerState,
    items: Vec<RecommendedQuestion>,
    error: Option<ApiError>,
    policy: PollPolicy,
    generation: Arc<AtomicU64>,
}

impl RecommendationPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            state: PollerState::Idle,
            items: Vec::new(),
            error: None,
            policy,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> &PollerState {
        &self.state
    }

    /// Last results; kept on screen while a refresh is in flight.
    pub fn items(&self) -> &[RecommendedQuestion] {
        &self.items
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PollPolicy) {
        self.policy = policy;
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            PollerState::Requesting | PollerState::Polling { .. }
        )
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start a new job, superseding any loop still running. Returns the
    /// generation to tag the request with.
    pub fn request(&mut self) -> u64 {
        let generation = self.bump();
        self.state = PollerState::Requesting;
        self.error = None;
        generation
    }

    pub fn complete_request(
        &mut self,
        generation: u64,
        result: Result<RecommendationJob, ApiError>,
    ) -> Option<PollTask> {
        if generation != self.generation() || self.state != PollerState::Requesting {
            return None;
        }
        match result {
            Ok(job) => {
                self.state = PollerState::Polling {
                    rec_id: job.rec_id.clone(),
                    attempt: 0,
                };
                Some(PollTask {
                    rec_id: job.rec_id,
                    policy: self.policy,
                    cancel: CancelToken {
                        shared: self.generation.clone(),
                        generation,
                    },
                })
            }
            Err(e) => {
                warn!(error = %e, "recommendation request failed");
                self.state = PollerState::Idle;
                self.error = Some(e);
                None
            }
        }
    }

    fn is_current(&self, generation: u64, rec_id: &str) -> bool {
        generation == self.generation()
            && matches!(&self.state, PollerState::Polling { rec_id: current, .. } if current == rec_id)
    }

    pub fn record_attempt(&mut self, generation: u64, rec_id: &str, attempt: u32) {
        if self.is_current(generation, rec_id) {
            self.state = PollerState::Polling {
                rec_id: rec_id.to_string(),
                attempt,
            };
        }
    }

    /// Commit a finished loop. Returns false when the outcome belongs to a
    /// superseded job.
    pub fn complete_poll(&mut self, generation: u64, rec_id: &str, outcome: PollOutcome) -> bool {
        if !self.is_current(generation, rec_id) {
            debug!(rec_id, generation, "stale poll outcome dropped");
            return false;
        }
        match outcome {
            PollOutcome::Ready(items) => {
                self.items = items;
                self.state = PollerState::Ready;
            }
            PollOutcome::TimedOut => {
                self.items.clear();
                self.state = PollerState::TimedOut;
            }
            PollOutcome::Cancelled => self.state = PollerState::Idle,
            PollOutcome::Failed(e) => {
                self.error = Some(e);
                self.state = PollerState::Idle;
            }
        }
        true
    }

    /// Stop the active loop (view teardown).
    pub fn cancel(&mut self) {
        if self.is_busy() {
            info!("recommendation polling cancelled");
        }
        self.bump();
        self.state = PollerState::Idle;
    }
}
