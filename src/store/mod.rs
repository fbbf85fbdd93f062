//! Label store contract.
//!
//! The label store owns class definitions, examples, results and the
//! training algorithm. The capture pipeline only drives it through
//! [`LabelStore`]. [`MemoryLabelStore`] is a slot-based implementation used
//! by the command line tool and the tests.

mod memory;
mod types;

use async_trait::async_trait;

use crate::source::Frame;

pub use memory::{MemoryLabelStore, DEFAULT_SLOTS};
pub use types::{ClassEntry, ClassResult, DatasetEntry, StoreError};

/// Operations the capture/train/persist pipeline needs from a label store.
///
/// Implementations use interior mutability: every method takes `&self` so
/// the store can be shared by the recording session, the training gate and
/// the archive codec at once. `classes()` and `results()` always have the
/// same length.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Snapshot of every class slot.
    fn classes(&self) -> Vec<ClassEntry>;

    /// Snapshot of every result slot.
    fn results(&self) -> Vec<ClassResult>;

    /// Enable the class slot at `index`.
    fn add_class(&self, index: usize) -> Result<(), StoreError>;

    /// Delete the class at `index` along with its examples and result.
    fn remove_class(&self, index: usize) -> Result<(), StoreError>;

    fn rename(&self, index: usize, name: &str) -> Result<(), StoreError>;

    fn set_result_name(&self, index: usize, name: Option<&str>) -> Result<(), StoreError>;

    /// Append one sample to the class at `index`.
    fn add_example(&self, frame: Frame, index: usize) -> Result<(), StoreError>;

    /// Drop every example of the class at `index`, keeping the class.
    fn clear_class(&self, index: usize) -> Result<(), StoreError>;

    /// Run the training algorithm over the current examples.
    async fn train(&self) -> Result<(), StoreError>;

    /// Per-class trained snapshots, in class order.
    async fn classifier_dataset(&self) -> Result<Vec<DatasetEntry>, StoreError>;

    /// Replace the trained snapshots in one call.
    fn set_classifier_dataset(&self, dataset: Vec<DatasetEntry>) -> Result<(), StoreError>;

    /// Persist pending changes. Called once on teardown.
    fn save_changes(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
