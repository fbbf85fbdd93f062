//! `classifier.collection.json`: one record per class index.

use serde::{Deserialize, Serialize};

use super::FORMAT_VERSION;
use crate::store::{ClassEntry, ClassResult, DatasetEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub name: String,
    pub enable: bool,
    #[serde(default = "default_version")]
    pub version: String,
    pub result: ResultRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Serialized as `null` when unlabeled; never omitted.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetEntry>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Build the manifest from store snapshots.
///
/// Dataset snapshots are attached to the record of their class only when
/// that class's result is labeled; entries for unknown classes are dropped.
pub fn build_manifest(
    classes: &[ClassEntry],
    results: &[ClassResult],
    dataset: Vec<DatasetEntry>,
) -> Vec<ManifestRecord> {
    let mut records: Vec<ManifestRecord> = classes
        .iter()
        .zip(results)
        .map(|(class, result)| ManifestRecord {
            name: class.name.clone(),
            enable: class.enabled,
            version: FORMAT_VERSION.to_string(),
            result: ResultRecord {
                name: result.name.clone(),
                dataset: None,
            },
        })
        .collect();

    for entry in dataset {
        match records.get_mut(entry.class_id) {
            Some(record) if record.result.name.is_some() => record.result.dataset = Some(entry),
            Some(_) => log::debug!(
                "Omitting dataset for unlabeled class {} from manifest",
                entry.class_id
            ),
            None => log::warn!("Dataset entry for unknown class {} dropped", entry.class_id),
        }
    }
    records
}

/// Dataset snapshots to hand to the store on import, in manifest order.
///
/// Records with a null result name contribute nothing.
pub fn collect_dataset(records: &[ManifestRecord]) -> Vec<DatasetEntry> {
    records
        .iter()
        .filter(|record| record.result.name.is_some())
        .filter_map(|record| record.result.dataset.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class(name: &str, enabled: bool) -> ClassEntry {
        ClassEntry {
            name: name.to_string(),
            enabled,
            examples: Vec::new(),
        }
    }

    fn result(name: Option<&str>) -> ClassResult {
        ClassResult {
            name: name.map(str::to_string),
            rate: 0.0,
        }
    }

    #[test]
    fn test_unlabeled_class_gets_no_dataset() {
        let records = build_manifest(
            &[class("cat", true), class("dog", false)],
            &[result(Some("cat")), result(None)],
            vec![DatasetEntry::new(0), DatasetEntry::new(1), DatasetEntry::new(7)],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].result.dataset, Some(DatasetEntry::new(0)));
        assert_eq!(records[1].result.dataset, None);
    }

    #[test]
    fn test_record_json_shape() {
        let records = build_manifest(
            &[class("dog", false)],
            &[result(None)],
            Vec::new(),
        );
        let value = serde_json::to_value(&records).unwrap();
        assert_eq!(
            value,
            json!([{
                "name": "dog",
                "enable": false,
                "version": "1.0.0",
                "result": {"name": null}
            }])
        );
    }

    #[test]
    fn test_parse_tolerates_missing_version_and_dataset() {
        let records: Vec<ManifestRecord> = serde_json::from_value(json!([
            {"name": "a", "enable": true, "result": {"name": "a"}}
        ]))
        .unwrap();
        assert_eq!(records[0].version, FORMAT_VERSION);
        assert_eq!(records[0].result.dataset, None);
    }

    #[test]
    fn test_collect_dataset_skips_null_names() {
        let records: Vec<ManifestRecord> = serde_json::from_value(json!([
            {"name": "a", "enable": true, "result": {"name": "a", "dataset": {"classId": 0, "w": 1}}},
            {"name": "b", "enable": true, "result": {"name": null, "dataset": {"classId": 1}}},
            {"name": "c", "enable": false, "result": {"name": "c"}},
            {"name": "d", "enable": false, "result": {"name": "d", "dataset": {"classId": 3}}}
        ]))
        .unwrap();
        let ids: Vec<usize> = collect_dataset(&records).iter().map(|e| e.class_id).collect();
        assert_eq!(ids, vec![0, 3]);
    }
}
