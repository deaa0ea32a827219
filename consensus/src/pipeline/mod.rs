pub mod solidification_processor;

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct ProcessingCounters {
    pub quick_solidified: AtomicU64,
    pub cascade_solidified: AtomicU64,
    pub cascade_checks: AtomicU64,
    pub retries_enqueued: AtomicU64,
}

impl ProcessingCounters {
    pub fn snapshot(&self) -> ProcessingCountersSnapshot {
        ProcessingCountersSnapshot {
            quick_solidified: self.quick_solidified.load(Ordering::SeqCst),
            cascade_solidified: self.cascade_solidified.load(Ordering::SeqCst),
            cascade_checks: self.cascade_checks.load(Ordering::SeqCst),
            retries_enqueued: self.retries_enqueued.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProcessingCountersSnapshot {
    pub quick_solidified: u64,
    pub cascade_solidified: u64,
    pub cascade_checks: u64,
    pub retries_enqueued: u64,
}
