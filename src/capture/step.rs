//! Host step interval shared between the host and the capture loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Floor applied to the step so a zero interval cannot spin the loop.
pub const MIN_STEP: Duration = Duration::from_millis(1);

/// The host's current tick duration, readable while it changes.
///
/// Clones share the same value: the host updates it, the capture loop reads
/// it before every reschedule.
#[derive(Debug, Clone)]
pub struct StepInterval {
    micros: Arc<AtomicU64>,
}

impl StepInterval {
    pub fn new(step: Duration) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(step.as_micros() as u64)),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn get(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed)).max(MIN_STEP)
    }

    pub fn set(&self, step: Duration) {
        self.micros.store(step.as_micros() as u64, Ordering::Relaxed);
    }
}
