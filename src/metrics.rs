//! Request outcome counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Final classification of one version-check request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BadRequest,
    Forbidden,
    Error,
    UpToDate,
    OutOfDate,
}

/// Receives one notification per handled request
pub trait MetricsObserver: Send + Sync + 'static {
    fn observe(&self, outcome: Outcome);
}

/// Lock-free counters, one per [`Outcome`]
#[derive(Debug, Default)]
pub struct RequestCounters {
    bad_request: AtomicU64,
    forbidden: AtomicU64,
    error: AtomicU64,
    up_to_date: AtomicU64,
    out_of_date: AtomicU64,
}

/// Counter values at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub bad_request: u64,
    pub forbidden: u64,
    pub error: u64,
    pub up_to_date: u64,
    pub out_of_date: u64,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            bad_request: self.bad_request.load(Ordering::Relaxed),
            forbidden: self.forbidden.load(Ordering::Relaxed),
            error: self.error.load(Ordering::Relaxed),
            up_to_date: self.up_to_date.load(Ordering::Relaxed),
            out_of_date: self.out_of_date.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, outcome: Outcome) -> &AtomicU64 {
        match outcome {
            Outcome::BadRequest => &self.bad_request,
            Outcome::Forbidden => &self.forbidden,
            Outcome::Error => &self.error,
            Outcome::UpToDate => &self.up_to_date,
            Outcome::OutOfDate => &self.out_of_date,
        }
    }
}

impl MetricsObserver for RequestCounters {
    fn observe(&self, outcome: Outcome) {
        self.counter(outcome).fetch_add(1, Ordering::Relaxed);
    }
}
