//! In-memory dataset

use crate::config::StoreConfig;
use crate::sample::{Sample, SampleId};
use crate::store::{Document, MemoryStore, QueryService, StoreResult};
use crate::view::{ViewError, ViewResult};

use super::dataset::Dataset;

/// Named collection of [`Sample`]s backed by a [`MemoryStore`]
pub struct MemoryDataset {
    name: String,
    store: MemoryStore,
}

impl MemoryDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_store(name, MemoryStore::new())
    }

    /// Creates an empty dataset using the store settings
    pub fn with_config(name: impl Into<String>, config: &StoreConfig) -> Self {
        let store = match config.sample_seed {
            Some(seed) => MemoryStore::with_sample_seed(seed),
            None => MemoryStore::new(),
        };
        Self::with_store(name, store)
    }

    pub fn with_store(name: impl Into<String>, store: MemoryStore) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Builds a dataset from samples, in iteration order
    pub fn from_samples<I>(name: impl Into<String>, samples: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut dataset = Self::new(name);
        for sample in samples {
            dataset.insert(&sample)?;
        }
        Ok(dataset)
    }

    /// Adds a sample. Fails on a duplicate identifier.
    pub fn insert(&mut self, sample: &Sample) -> StoreResult<SampleId> {
        self.store.insert(sample.to_document())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Backing store
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl Dataset for MemoryDataset {
    type Sample = Sample;

    fn name(&self) -> &str {
        &self.name
    }

    fn query_service(&self) -> &dyn QueryService {
        &self.store
    }

    fn sample_from_document(&self, document: Document) -> ViewResult<Sample> {
        Ok(Sample::from_document(document)?)
    }

    fn get_by_id(&self, id: &SampleId) -> ViewResult<Sample> {
        let document = self.store.get(id).ok_or(ViewError::NotFound(*id))?;
        self.sample_from_document(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_samples_keeps_order() {
        let samples: Vec<Sample> = (0..3)
            .map(|i| Sample::new(format!("/data/{}.jpg", i)))
            .collect();
        let dataset = MemoryDataset::from_samples("ordered", samples.clone()).unwrap();

        assert_eq!(dataset.name(), "ordered");
        assert_eq!(dataset.len(), 3);
        let ids: Vec<String> = dataset
            .store()
            .iter()
            .map(|doc| doc["_id"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = samples.iter().map(|s| s.id.to_canonical()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let sample = Sample::new("/data/a.jpg");
        let mut dataset = MemoryDataset::new("dups");
        dataset.insert(&sample).unwrap();

        let err = dataset.insert(&sample).unwrap_err();
        assert_eq!(err.code().code(), "STORE_DUPLICATE_ID");
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_get_by_id() {
        let sample = Sample::new("/data/a.jpg")
            .with_tag("train")
            .with_field("label", json!("cat"));
        let mut dataset = MemoryDataset::new("lookup");
        let id = dataset.insert(&sample).unwrap();

        assert_eq!(dataset.get_by_id(&id).unwrap(), sample);

        let missing = SampleId::new();
        let err = dataset.get_by_id(&missing).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_sample_from_bad_document() {
        let dataset = MemoryDataset::new("bad");
        let err = dataset
            .sample_from_document(json!({"_id": 7}))
            .unwrap_err();
        assert_eq!(err.code(), "VIEW_DESERIALIZE_FAILED");
    }

    #[test]
    fn test_with_config_seed() {
        let config = StoreConfig {
            sample_seed: Some(3),
        };
        let dataset = MemoryDataset::with_config("seeded", &config);
        assert!(dataset.is_empty());
    }
}
