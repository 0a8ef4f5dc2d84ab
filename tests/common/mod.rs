//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use decider_core::{
    BlobStore, Coordinate, DecideError, MemoryBlobStore, OptionSession, PlaceSearchProvider,
    PlacesConfig, SearchHit, SearchRequest, SelectionEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fresh in-memory blob store
pub fn memory_blobs() -> Arc<dyn BlobStore> {
    Arc::new(MemoryBlobStore::new())
}

/// Option session over fresh memory blobs with a reproducible engine
pub fn seeded_options(seed: u64) -> OptionSession {
    OptionSession::with_engine(memory_blobs(), SelectionEngine::seeded(seed))
}

pub fn toronto() -> Coordinate {
    PlacesConfig::default().default_origin
}

/// Search hit located at the default origin
pub fn hit(name: &str, rating: Option<f64>) -> SearchHit {
    let origin = toronto();
    SearchHit {
        name: name.to_string(),
        lat: origin.lat,
        lng: origin.lng,
        rating,
        external_id: format!("{}-id", name.to_lowercase()),
    }
}

/// Search provider that answers after a delay, echoing the keyword as a single hit
pub struct SlowSearch {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowSearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceSearchProvider for SlowSearch {
    async fn search(&self, request: &SearchRequest) -> decider_core::Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(vec![hit(&request.keyword, Some(4.0))])
    }
}

/// Search provider that always fails
pub struct BrokenSearch;

#[async_trait]
impl PlaceSearchProvider for BrokenSearch {
    async fn search(&self, _request: &SearchRequest) -> decider_core::Result<Vec<SearchHit>> {
        Err(DecideError::Provider("connection reset".to_string()))
    }
}
