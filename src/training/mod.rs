//! Training orchestrator.
//!
//! At most one training run is in flight. A trigger while busy is ignored,
//! not queued. The trigger marks the gate busy, yields so the busy state can
//! be shown, re-checks that it was not cancelled meanwhile, and only then
//! calls the trainer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::store::{LabelStore, StoreError};

/// Delay between marking the gate busy and invoking the trainer.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

/// How a [`TrainingGate::train`] call ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// The trainer ran to completion.
    Completed,
    /// Another run was already in flight; nothing happened.
    Ignored,
    /// The gate was cancelled before the trainer was invoked.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("training failed: {0}")]
    Failed(#[from] StoreError),
}

/// Single-flight gate around the label store's trainer.
///
/// Clones share state, so the UI can hold one to read [`is_busy`](Self::is_busy)
/// while another drives training.
#[derive(Debug, Clone)]
pub struct TrainingGate {
    /// Id of the run holding the gate; 0 when idle.
    active: Arc<AtomicU64>,
    next_run: Arc<AtomicU64>,
    settle: Duration,
}

impl Default for TrainingGate {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}

impl TrainingGate {
    pub fn new(settle: Duration) -> Self {
        Self {
            active: Arc::new(AtomicU64::new(0)),
            next_run: Arc::new(AtomicU64::new(0)),
            settle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }

    /// Clear the busy flag without waiting for an in-flight run.
    ///
    /// A run that has not reached the trainer yet will not start; one that
    /// has keeps running and its completion leaves the gate untouched.
    pub fn cancel(&self) {
        if self.active.swap(0, Ordering::SeqCst) != 0 {
            log::debug!("Training busy flag cleared");
        }
    }

    pub async fn train(&self, store: &dyn LabelStore) -> Result<TrainOutcome, TrainError> {
        let run = self.next_run.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .active
            .compare_exchange(0, run, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Training already in progress; request ignored");
            return Ok(TrainOutcome::Ignored);
        }

        if self.settle.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.settle).await;
        }

        if self.active.load(Ordering::SeqCst) != run {
            log::info!("Training cancelled before start");
            return Ok(TrainOutcome::Cancelled);
        }

        log::info!("Training started");
        let result = store.train().await;
        let still_current = self
            .active
            .compare_exchange(run, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();

        match result {
            Ok(()) => {
                if still_current {
                    log::info!("Training finished");
                } else {
                    log::debug!("Training finished after the gate was cleared");
                }
                Ok(TrainOutcome::Completed)
            }
            Err(e) => {
                log::error!("Training failed: {}", e);
                Err(TrainError::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Frame;
    use crate::store::{ClassEntry, ClassResult, DatasetEntry};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingTrainer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LabelStore for CountingTrainer {
        fn classes(&self) -> Vec<ClassEntry> {
            Vec::new()
        }
        fn results(&self) -> Vec<ClassResult> {
            Vec::new()
        }
        fn add_class(&self, _index: usize) -> Result<(), StoreError> {
            Ok(())
        }
        fn remove_class(&self, _index: usize) -> Result<(), StoreError> {
            Ok(())
        }
        fn rename(&self, _index: usize, _name: &str) -> Result<(), StoreError> {
            Ok(())
        }
        fn set_result_name(&self, _index: usize, _name: Option<&str>) -> Result<(), StoreError> {
            Ok(())
        }
        fn add_example(&self, _frame: Frame, _index: usize) -> Result<(), StoreError> {
            Ok(())
        }
        fn clear_class(&self, _index: usize) -> Result<(), StoreError> {
            Ok(())
        }
        async fn train(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(500)).await;
            if self.fail {
                Err(StoreError::Training("boom".to_string()))
            } else {
                Ok(())
            }
        }
        async fn classifier_dataset(&self) -> Result<Vec<DatasetEntry>, StoreError> {
            Ok(Vec::new())
        }
        fn set_classifier_dataset(&self, _dataset: Vec<DatasetEntry>) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_trigger_is_ignored() {
        let gate = TrainingGate::default();
        let store = CountingTrainer::default();

        let (first, second) = tokio::join!(gate.train(&store), gate.train(&store));
        assert_eq!(first.unwrap(), TrainOutcome::Completed);
        assert_eq!(second.unwrap(), TrainOutcome::Ignored);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(!gate.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_settle_skips_trainer() {
        let gate = TrainingGate::default();
        let store = CountingTrainer::default();
        let canceller = gate.clone();

        let (outcome, ()) = tokio::join!(gate.train(&store), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(canceller.is_busy());
            canceller.cancel();
        });
        assert_eq!(outcome.unwrap(), TrainOutcome::Cancelled);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_does_not_clear_new_run() {
        let gate = TrainingGate::new(Duration::ZERO);
        let store = CountingTrainer::default();
        let other = gate.clone();

        let (first, second) = tokio::join!(gate.train(&store), async {
            // First run is inside the trainer; tear down and start over.
            tokio::time::sleep(Duration::from_millis(100)).await;
            other.cancel();
            other.train(&store).await
        });
        assert_eq!(first.unwrap(), TrainOutcome::Completed);
        assert_eq!(second.unwrap(), TrainOutcome::Completed);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        assert!(!gate.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_busy_and_surfaces_error() {
        let gate = TrainingGate::default();
        let store = CountingTrainer {
            fail: true,
            ..Default::default()
        };
        let err = gate.train(&store).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(!gate.is_busy());

        // Not retried automatically.
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_keeps_previous_results() {
        use crate::store::MemoryLabelStore;

        let gate = TrainingGate::default();
        let store = MemoryLabelStore::new(2);
        store.add_class(0).unwrap();
        store.rename(0, "mug").unwrap();
        store.add_example(Frame::blank(2, 2), 0).unwrap();
        assert_eq!(gate.train(&store).await.unwrap(), TrainOutcome::Completed);

        let dataset = store.classifier_dataset().await.unwrap();
        let results = store.results();
        assert_eq!(dataset.len(), 1);

        store.clear_class(0).unwrap();
        let err = gate.train(&store).await.unwrap_err();
        assert!(matches!(err, TrainError::Failed(StoreError::NothingToTrain)));
        assert!(!gate.is_busy());

        assert_eq!(store.classifier_dataset().await.unwrap(), dataset);
        assert_eq!(store.results(), results);
    }
}
