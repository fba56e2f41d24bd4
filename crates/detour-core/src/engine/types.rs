use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::model::RiskScore;
use crate::ranking::RankedAlternative;

/// A decoded scoring request, handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    /// Caller-supplied identifier, echoed in logs only.
    pub item_id: Option<String>,
    pub features: Vec<f32>,
    /// Requested recommendation length; `None` uses the configured default.
    pub top_k: Option<usize>,
}

/// The orchestrator's answer for one request.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub request_id: Uuid,
    pub risk: RiskScore,
    /// Whether the risk score reached the action threshold.
    pub action_triggered: bool,
    /// Empty when the threshold was not reached or no candidate survived
    /// the margin filter.
    pub alternatives: Vec<RankedAlternative>,
    /// Whether this outcome was served from the response cache.
    pub cached: bool,
}

/// The cacheable part of an outcome (request id and cache flag are
/// per-request).
#[derive(Debug)]
pub(crate) struct CachedOutcome {
    pub risk: RiskScore,
    pub action_triggered: bool,
    pub alternatives: Vec<RankedAlternative>,
}

/// Absolute per-request deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left until the deadline, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

/// Cooperative cancellation flag shared between the transport and the
/// orchestrator. The transport sets it when the caller goes away; the
/// orchestrator checks it between pipeline steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
