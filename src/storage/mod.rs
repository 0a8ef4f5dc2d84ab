//! Storage layer for persisted candidates
//!
//! Candidates are kept as whole-collection JSON blobs in a key-value
//! [`BlobStore`]. Two keys exist: `options` (the option list) and `places`
//! (the place weight-history table keyed by `placeId`).
//!
//! Loading never fails: an absent, corrupt or wrongly shaped blob reads as an
//! empty collection. Saving is best-effort: failures are logged and dropped.
//! Use `try_load`/`try_save` when the caller needs to see the error.

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

use crate::error::Result;
use crate::types::{Place, Weight};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Blob key for the option list
pub const OPTIONS_KEY: &str = "options";

/// Blob key for the place weight history
pub const PLACES_KEY: &str = "places";

/// Durable key-value blob store
pub trait BlobStore: Send + Sync {
    /// Read the blob under `key`, `None` if absent
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob under `key`
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Delete the blob under `key` (absent is fine)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Pass-through serializer for one collection kind
pub struct CandidateStore<T> {
    blobs: Arc<dyn BlobStore>,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CandidateStore<T> {
    fn clone(&self) -> Self {
        Self {
            blobs: Arc::clone(&self.blobs),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> CandidateStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(blobs: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the collection, empty on any failure
    pub fn load(&self) -> Vec<T> {
        match self.try_load() {
            Ok(items) => items,
            Err(e) => {
                warn!("Discarding unreadable '{}' blob: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Load the collection, surfacing read and decode errors
    pub fn try_load(&self) -> Result<Vec<T>> {
        match self.blobs.read(&self.key)? {
            Some(bytes) => {
                let items: Vec<T> = serde_json::from_slice(&bytes)?;
                debug!("Loaded {} entries from '{}'", items.len(), self.key);
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Persist the collection; failures are logged and dropped
    pub fn save(&self, items: &[T]) {
        if let Err(e) = self.try_save(items) {
            warn!("Dropped write of '{}': {}", self.key, e);
        }
    }

    /// Persist the collection, surfacing encode and write errors
    pub fn try_save(&self, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec(items)?;
        self.blobs.write(&self.key, &bytes)?;
        debug!("Saved {} entries to '{}'", items.len(), self.key);
        Ok(())
    }
}

/// Durable place weight table keyed by `placeId`
///
/// Search results carry ephemeral ids. Weight learned through feedback is kept
/// here under the place's external id and merged back on the next search.
#[derive(Clone)]
pub struct WeightHistory {
    store: CandidateStore<Place>,
}

impl WeightHistory {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            store: CandidateStore::new(blobs, PLACES_KEY),
        }
    }

    /// All recorded places in stored order
    pub fn entries(&self) -> Vec<Place> {
        self.store.load()
    }

    /// Weights indexed by `placeId`
    pub fn weights(&self) -> HashMap<String, Weight> {
        self.entries()
            .into_iter()
            .map(|p| (p.place_id, p.weight))
            .collect()
    }

    /// Learned weight for one place, default weight when unknown
    pub fn weight_for(&self, place_id: &str) -> Weight {
        self.weights().get(place_id).copied().unwrap_or_default()
    }

    /// Merge `place` into the table, replacing any entry with the same `placeId`
    ///
    /// Unrelated entries and their order are left untouched.
    pub fn record(&self, place: &Place) {
        let mut entries = self.entries();
        match entries.iter_mut().find(|p| p.place_id == place.place_id) {
            Some(existing) => *existing = place.clone(),
            None => entries.push(place.clone()),
        }
        self.store.save(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateId, Coordinate, DecisionOption};

    fn memory_store() -> Arc<dyn BlobStore> {
        Arc::new(MemoryBlobStore::new())
    }

    #[test]
    fn test_missing_blob_loads_empty() {
        let store: CandidateStore<DecisionOption> =
            CandidateStore::new(memory_store(), OPTIONS_KEY);
        assert!(store.load().is_empty());
        assert!(store.try_load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let blobs = memory_store();
        blobs.write(OPTIONS_KEY, b"{not json at all").unwrap();

        let store: CandidateStore<DecisionOption> = CandidateStore::new(blobs, OPTIONS_KEY);
        assert!(store.load().is_empty());
        assert!(store.try_load().is_err());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let blobs = memory_store();
        blobs
            .write(OPTIONS_KEY, br#"{"name": "not a list"}"#)
            .unwrap();

        let store: CandidateStore<DecisionOption> = CandidateStore::new(blobs, OPTIONS_KEY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let store: CandidateStore<DecisionOption> =
            CandidateStore::new(memory_store(), OPTIONS_KEY);
        let options = vec![
            DecisionOption::new("Pizza", vec!["cheap".to_string()]).with_weight(3),
            DecisionOption::new("Sushi", vec![]),
            DecisionOption::new("Tacos", vec!["fast".to_string(), "cheap".to_string()]),
        ];

        store.save(&options);
        assert_eq!(store.load(), options);
    }

    #[test]
    fn test_zero_weight_in_blob_is_clamped() {
        let blobs = memory_store();
        let raw = serde_json::json!([
            {"id": CandidateId::new(), "name": "Ramen", "tags": [], "weight": 0}
        ]);
        blobs
            .write(OPTIONS_KEY, raw.to_string().as_bytes())
            .unwrap();

        let store: CandidateStore<DecisionOption> = CandidateStore::new(blobs, OPTIONS_KEY);
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].weight, Weight::MIN);
    }

    #[test]
    fn test_history_defaults_to_min_weight() {
        let history = WeightHistory::new(memory_store());
        assert_eq!(history.weight_for("unknown"), Weight::MIN);
    }

    #[test]
    fn test_history_record_merges_by_place_id() {
        let history = WeightHistory::new(memory_store());
        let origin = Coordinate::new(43.65, -79.38);

        history.record(&Place::new("A", 100.0, 4.0, origin, "a").with_weight(2));
        history.record(&Place::new("B", 200.0, 3.0, origin, "b").with_weight(5));
        // A new search produces a new ephemeral id for the same place
        history.record(&Place::new("A", 150.0, 4.1, origin, "a").with_weight(3));

        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].place_id, "a");
        assert_eq!(entries[0].weight.get(), 3);
        assert_eq!(entries[1].place_id, "b");
        assert_eq!(history.weight_for("b").get(), 5);
    }
}
