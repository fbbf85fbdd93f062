//! In-memory, slot-based label store.
//!
//! A fixed number of class slots exist from construction; `add_class`
//! enables a slot and `remove_class` returns it to the disabled state, so
//! slot indices never shift. The bundled trainer is a nearest-centroid
//! placeholder: it records each class's mean colour and sample count as the
//! opaque dataset payload.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use super::types::{ClassEntry, ClassResult, DatasetEntry, StoreError};
use super::LabelStore;
use crate::source::Frame;

/// Number of class slots when none is configured.
pub const DEFAULT_SLOTS: usize = 10;

#[derive(Debug)]
struct Inner {
    classes: Vec<ClassEntry>,
    results: Vec<ClassResult>,
    dataset: Vec<DatasetEntry>,
}

#[derive(Debug)]
pub struct MemoryLabelStore {
    inner: Mutex<Inner>,
    example_limit: Option<usize>,
}

fn default_class_name(index: usize) -> String {
    format!("Class {}", index + 1)
}

impl MemoryLabelStore {
    pub fn new(slots: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                classes: (0..slots)
                    .map(|i| ClassEntry::disabled(default_class_name(i)))
                    .collect(),
                results: vec![ClassResult::default(); slots],
                dataset: Vec::new(),
            }),
            example_limit: None,
        }
    }

    /// Cap the number of examples a single class may hold.
    pub fn with_example_limit(mut self, limit: usize) -> Self {
        self.example_limit = Some(limit);
        self
    }

    pub fn slot_count(&self) -> usize {
        self.lock().classes.len()
    }

    /// Number of examples held by the class at `index` (0 when out of range).
    pub fn example_count(&self, index: usize) -> usize {
        self.lock()
            .classes
            .get(index)
            .map(|c| c.examples.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_slot<T>(
        &self,
        index: usize,
        f: impl FnOnce(&mut Inner) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut inner = self.lock();
        let len = inner.classes.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        f(&mut inner)
    }
}

impl Default for MemoryLabelStore {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

/// Mean R, G, B over every pixel of every example.
fn mean_colour(examples: &[Frame]) -> [f64; 3] {
    let mut sum = [0f64; 3];
    let mut pixels = 0u64;
    for frame in examples {
        let bpp = frame.bytes_per_pixel();
        for px in frame.data.chunks_exact(bpp) {
            for (channel, value) in sum.iter_mut().zip(px.iter()) {
                *channel += f64::from(*value);
            }
            pixels += 1;
        }
    }
    if pixels == 0 {
        return sum;
    }
    sum.map(|c| c / pixels as f64)
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    fn classes(&self) -> Vec<ClassEntry> {
        self.lock().classes.clone()
    }

    fn results(&self) -> Vec<ClassResult> {
        self.lock().results.clone()
    }

    fn add_class(&self, index: usize) -> Result<(), StoreError> {
        self.with_slot(index, |inner| {
            inner.classes[index].enabled = true;
            Ok(())
        })
    }

    fn remove_class(&self, index: usize) -> Result<(), StoreError> {
        self.with_slot(index, |inner| {
            inner.classes[index] = ClassEntry::disabled(default_class_name(index));
            inner.results[index] = ClassResult::default();
            inner.dataset.retain(|entry| entry.class_id != index);
            Ok(())
        })
    }

    fn rename(&self, index: usize, name: &str) -> Result<(), StoreError> {
        self.with_slot(index, |inner| {
            inner.classes[index].name = name.to_string();
            Ok(())
        })
    }

    fn set_result_name(&self, index: usize, name: Option<&str>) -> Result<(), StoreError> {
        self.with_slot(index, |inner| {
            inner.results[index].name = name.map(str::to_string);
            Ok(())
        })
    }

    fn add_example(&self, frame: Frame, index: usize) -> Result<(), StoreError> {
        let limit = self.example_limit;
        self.with_slot(index, |inner| {
            let class = &mut inner.classes[index];
            if !class.enabled {
                return Err(StoreError::ClassDisabled(index));
            }
            if let Some(limit) = limit {
                if class.examples.len() >= limit {
                    return Err(StoreError::ExampleLimit { index, limit });
                }
            }
            class.examples.push(frame);
            Ok(())
        })
    }

    fn clear_class(&self, index: usize) -> Result<(), StoreError> {
        self.with_slot(index, |inner| {
            inner.classes[index].examples.clear();
            Ok(())
        })
    }

    async fn train(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let Inner {
            classes,
            results,
            dataset,
        } = &mut *inner;

        let trained: Vec<DatasetEntry> = classes
            .iter()
            .enumerate()
            .filter(|(_, class)| class.enabled && !class.examples.is_empty())
            .map(|(index, class)| {
                DatasetEntry::new(index)
                    .with_field("centroid", json!(mean_colour(&class.examples)))
                    .with_field("samples", json!(class.examples.len()))
            })
            .collect();

        if trained.is_empty() {
            return Err(StoreError::NothingToTrain);
        }

        for entry in &trained {
            let result = &mut results[entry.class_id];
            if result.name.is_none() {
                result.name = Some(classes[entry.class_id].name.clone());
            }
        }
        log::debug!("Trained {} class(es)", trained.len());
        *dataset = trained;
        Ok(())
    }

    async fn classifier_dataset(&self) -> Result<Vec<DatasetEntry>, StoreError> {
        Ok(self.lock().dataset.clone())
    }

    fn set_classifier_dataset(&self, dataset: Vec<DatasetEntry>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let len = inner.classes.len();
        if let Some(entry) = dataset.iter().find(|e| e.class_id >= len) {
            return Err(StoreError::IndexOutOfRange {
                index: entry.class_id,
                len,
            });
        }
        inner.dataset = dataset;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> Frame {
        Frame::rgba(1, 1, vec![r, g, b, 255]).unwrap()
    }

    #[test]
    fn test_new_store_has_paired_disabled_slots() {
        let store = MemoryLabelStore::new(4);
        assert_eq!(store.classes().len(), 4);
        assert_eq!(store.results().len(), 4);
        assert!(store.classes().iter().all(|c| !c.enabled));
        assert_eq!(store.classes()[2].name, "Class 3");
    }

    #[test]
    fn test_add_example_requires_enabled_class() {
        let store = MemoryLabelStore::new(2);
        assert_eq!(
            store.add_example(pixel(0, 0, 0), 0),
            Err(StoreError::ClassDisabled(0))
        );
        store.add_class(0).unwrap();
        store.add_example(pixel(0, 0, 0), 0).unwrap();
        assert_eq!(store.example_count(0), 1);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let store = MemoryLabelStore::new(2);
        assert_eq!(
            store.rename(5, "x"),
            Err(StoreError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_example_limit() {
        let store = MemoryLabelStore::new(1).with_example_limit(1);
        store.add_class(0).unwrap();
        store.add_example(pixel(1, 1, 1), 0).unwrap();
        assert_eq!(
            store.add_example(pixel(1, 1, 1), 0),
            Err(StoreError::ExampleLimit { index: 0, limit: 1 })
        );
    }

    #[test]
    fn test_remove_class_resets_slot_and_result() {
        let store = MemoryLabelStore::new(2);
        store.add_class(1).unwrap();
        store.rename(1, "dog").unwrap();
        store.set_result_name(1, Some("dog")).unwrap();
        store.add_example(pixel(1, 2, 3), 1).unwrap();

        store.remove_class(1).unwrap();
        let class = &store.classes()[1];
        assert!(!class.enabled);
        assert_eq!(class.name, "Class 2");
        assert!(class.examples.is_empty());
        assert_eq!(store.results()[1], ClassResult::default());
    }

    #[test]
    fn test_clear_class_keeps_class() {
        let store = MemoryLabelStore::new(1);
        store.add_class(0).unwrap();
        store.add_example(pixel(1, 2, 3), 0).unwrap();
        store.clear_class(0).unwrap();
        assert!(store.classes()[0].enabled);
        assert_eq!(store.example_count(0), 0);
    }

    #[tokio::test]
    async fn test_train_builds_centroids_and_labels_results() {
        let store = MemoryLabelStore::new(3);
        store.add_class(0).unwrap();
        store.rename(0, "cat").unwrap();
        store.add_example(pixel(10, 20, 30), 0).unwrap();
        store.add_example(pixel(30, 40, 50), 0).unwrap();
        store.add_class(1).unwrap();

        store.train().await.unwrap();

        let dataset = store.classifier_dataset().await.unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].class_id, 0);
        assert_eq!(dataset[0].payload["centroid"], json!([20.0, 30.0, 40.0]));
        assert_eq!(dataset[0].payload["samples"], json!(2));
        assert_eq!(store.results()[0].name.as_deref(), Some("cat"));
        assert_eq!(store.results()[1].name, None);
    }

    #[tokio::test]
    async fn test_train_without_examples_fails() {
        let store = MemoryLabelStore::new(2);
        store.add_class(0).unwrap();
        assert_eq!(store.train().await, Err(StoreError::NothingToTrain));
    }

    #[test]
    fn test_set_classifier_dataset_validates_class_ids() {
        let store = MemoryLabelStore::new(2);
        assert!(store
            .set_classifier_dataset(vec![DatasetEntry::new(1)])
            .is_ok());
        assert_eq!(
            store.set_classifier_dataset(vec![DatasetEntry::new(2)]),
            Err(StoreError::IndexOutOfRange { index: 2, len: 2 })
        );
    }
}
