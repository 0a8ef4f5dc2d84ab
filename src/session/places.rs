//! Place-search decision session
//!
//! Places are rebuilt from scratch on every search and carry ephemeral ids.
//! Learned weight lives in the [`WeightHistory`] table under `placeId`: it is
//! merged into fresh results on arrival and written back on feedback.
//!
//! # Search lifecycle
//!
//! A search is the only suspending operation. [`PlaceSession::begin_search`]
//! issues a [`SearchTicket`] and cancels the previous one. Results are applied
//! only while their ticket is still the current one and the session is open,
//! so a slow, superseded search can never overwrite newer results.
//! [`search_places`] drives the whole flow behind a [`SharedPlaceSession`].

use super::events::{EventBroadcaster, SessionEvent, SessionKind};
use super::state::{SelectionSlot, SessionState};
use crate::config::PlacesConfig;
use crate::error::DecideError;
use crate::feedback::{Feedback, FeedbackEngine};
use crate::filter::{CandidateFilter, PlaceFilter};
use crate::providers::{
    LocationProvider, PlaceDetail, PlaceDetailProvider, PlaceSearchProvider, SearchHit,
    SearchRequest,
};
use crate::selection::{SelectionEngine, SelectionMode};
use crate::storage::{BlobStore, WeightHistory};
use crate::types::{CandidateId, Coordinate, Place, Weight};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Place session behind the mutual-exclusion boundary used by async searches
pub type SharedPlaceSession = Arc<Mutex<PlaceSession>>;

/// Handle for one in-flight search
#[derive(Debug, Clone)]
pub struct SearchTicket {
    session: Uuid,
    generation: u64,
    keyword: String,
    radius_meters: u32,
    cancel: CancellationToken,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn radius_meters(&self) -> u32 {
        self.radius_meters
    }

    /// Resolves once a newer search starts or the session closes
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were applied; the count may be zero after a failure or timeout
    Applied(usize),
    /// A newer search started first
    Superseded,
    /// The session was closed before results arrived
    Discarded,
}

pub struct PlaceSession {
    places: Vec<Place>,
    filter: PlaceFilter,
    mode: SelectionMode,
    default_origin: Coordinate,
    search_timeout: Duration,
    detail_timeout: Duration,
    selection: SelectionSlot<Place>,
    engine: SelectionEngine,
    history: WeightHistory,
    events: EventBroadcaster,
    session_id: Uuid,
    generation: u64,
    in_flight: Option<CancellationToken>,
    closed: bool,
}

impl PlaceSession {
    pub fn new(blobs: Arc<dyn BlobStore>, config: &PlacesConfig) -> Self {
        Self::with_engine(blobs, config, SelectionEngine::new())
    }

    pub fn with_engine(
        blobs: Arc<dyn BlobStore>,
        config: &PlacesConfig,
        engine: SelectionEngine,
    ) -> Self {
        Self {
            places: Vec::new(),
            filter: PlaceFilter::new(config.default_min_rating, config.default_max_distance),
            mode: config.selection_mode,
            default_origin: config.default_origin,
            search_timeout: config.search_timeout,
            detail_timeout: config.detail_timeout,
            selection: SelectionSlot::new(),
            engine,
            history: WeightHistory::new(blobs),
            events: EventBroadcaster::default(),
            session_id: Uuid::new_v4(),
            generation: 0,
            in_flight: None,
            closed: false,
        }
    }

    /// Wrap for use with [`search_places`]
    pub fn into_shared(self) -> SharedPlaceSession {
        Arc::new(Mutex::new(self))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn history(&self) -> &WeightHistory {
        &self.history
    }

    pub fn filter(&self) -> &PlaceFilter {
        &self.filter
    }

    /// Set the rating floor; out-of-range input is ignored
    pub fn set_min_rating(&mut self, min_rating: f64) -> bool {
        let accepted = self.filter.set_min_rating(min_rating);
        if accepted {
            self.filters_changed();
        } else {
            debug!("Ignoring invalid min rating {}", min_rating);
        }
        accepted
    }

    /// Set the distance ceiling (and next search radius); invalid input is ignored
    pub fn set_max_distance(&mut self, max_distance: f64) -> bool {
        let accepted = self.filter.set_max_distance(max_distance);
        if accepted {
            self.filters_changed();
        } else {
            debug!("Ignoring invalid max distance {}", max_distance);
        }
        accepted
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }

    pub fn detail_timeout(&self) -> Duration {
        self.detail_timeout
    }

    /// Origin for the next search, falling back to the configured default
    pub fn origin(&self, location: &dyn LocationProvider) -> Coordinate {
        location.current_location().unwrap_or(self.default_origin)
    }

    /// Start a new search, superseding any in flight
    pub fn begin_search(&mut self, keyword: &str) -> SearchTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        SearchTicket {
            session: self.session_id,
            generation: self.generation,
            keyword: keyword.trim().to_string(),
            radius_meters: self.filter.max_distance().round() as u32,
            cancel,
        }
    }

    /// Replace the place list with results for `ticket`
    ///
    /// Ignored (and reported) when the ticket was superseded, was issued by
    /// another session, or the session has been closed. Weights are merged
    /// from history by `placeId`; later hits repeating a `placeId` are dropped.
    pub fn apply_search(
        &mut self,
        ticket: &SearchTicket,
        hits: Vec<SearchHit>,
        origin: Coordinate,
    ) -> SearchOutcome {
        if self.closed {
            return SearchOutcome::Discarded;
        }
        if ticket.session != self.session_id {
            warn!(
                "Ignoring search #{} issued by another session",
                ticket.generation
            );
            return SearchOutcome::Superseded;
        }
        if ticket.generation != self.generation || ticket.is_cancelled() {
            debug!(
                "Dropping results of superseded search #{}",
                ticket.generation
            );
            return SearchOutcome::Superseded;
        }

        let weights = self.history.weights();
        let mut seen = HashSet::new();
        self.places = hits
            .iter()
            .filter(|hit| seen.insert(hit.external_id.clone()))
            .map(|hit| {
                let weight = weights.get(&hit.external_id).copied().unwrap_or_default();
                Place::from_hit(hit, origin, weight)
            })
            .collect();
        self.in_flight = None;

        info!(
            "Applied {} places for '{}' (search #{})",
            self.places.len(),
            ticket.keyword,
            ticket.generation
        );
        self.events.emit(SessionEvent::search_applied(
            SessionKind::Places,
            ticket.keyword.clone(),
            self.places.len(),
        ));
        SearchOutcome::Applied(self.places.len())
    }

    /// Replace the place list directly (results obtained elsewhere)
    pub fn set_places(&mut self, places: Vec<Place>) {
        self.places = places;
        self.candidates_changed();
    }

    pub fn remove_place(&mut self, id: CandidateId) -> bool {
        let before = self.places.len();
        self.places.retain(|p| p.id != id);
        let removed = self.places.len() != before;
        if removed {
            self.candidates_changed();
        }
        removed
    }

    /// Places passing the rating floor and distance ceiling
    pub fn filtered(&self) -> Vec<&Place> {
        self.filter.apply(&self.places)
    }

    /// Pick one eligible place using the session's selection mode
    pub fn decide(&mut self) -> Option<&Place> {
        let chosen = {
            let eligible = self.filter.apply(&self.places);
            self.engine.decide_place(&eligible, self.mode).cloned()
        };

        match chosen {
            Some(place) => {
                debug!("Decided on place '{}' ({:?})", place.name, self.mode);
                self.events.emit(SessionEvent::decided(
                    SessionKind::Places,
                    place.place_id.clone(),
                    place.name.clone(),
                ));
                self.selection.select(place);
                self.selection.current()
            }
            None => {
                self.events
                    .emit(SessionEvent::no_candidate(SessionKind::Places));
                None
            }
        }
    }

    pub fn selected(&self) -> Option<&Place> {
        self.selection.current()
    }

    pub fn state(&self) -> SessionState {
        self.selection.state()
    }

    pub fn mark_presented(&mut self) -> bool {
        self.selection.mark_presented()
    }

    /// Feedback on the current selection, written through to weight history
    pub fn feedback(&mut self, feedback: impl Into<Feedback>) -> Option<Weight> {
        let selected = self.selection.take()?;
        self.adjust_weight(&selected.place_id, feedback.into())
    }

    /// Feedback on a place from the current results by `placeId`
    pub fn adjust_weight(&mut self, place_id: &str, feedback: Feedback) -> Option<Weight> {
        let key = place_id.to_string();
        let weight = FeedbackEngine::apply(&mut self.places, &key, feedback);
        match weight {
            Some(weight) => {
                if let Some(place) = self.places.iter().find(|p| p.place_id == place_id) {
                    self.history.record(place);
                }
                self.events.emit(SessionEvent::feedback_applied(
                    SessionKind::Places,
                    key,
                    feedback.is_liked(),
                    weight.get(),
                ));
            }
            None => debug!("Place {} not in current results", place_id),
        }
        weight
    }

    pub fn dismiss(&mut self) {
        if self.selection.take().is_some() {
            self.events
                .emit(SessionEvent::selection_cleared(SessionKind::Places));
        }
    }

    /// Tear down: cancel any search and refuse late results
    pub fn close(&mut self) {
        self.closed = true;
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn candidates_changed(&self) {
        self.events.emit(SessionEvent::candidates_changed(
            SessionKind::Places,
            self.places.len(),
        ));
    }

    fn filters_changed(&self) {
        let eligible = self.filtered().len();
        self.events
            .emit(SessionEvent::filters_changed(SessionKind::Places, eligible));
    }
}

/// Run a search for `keyword` and apply the results if still relevant
///
/// The session lock is held only while issuing the ticket and while applying
/// results, never across the provider call. Provider errors and timeouts are
/// applied as an empty result. An empty keyword clears the list immediately.
pub async fn search_places(
    session: &SharedPlaceSession,
    provider: &dyn PlaceSearchProvider,
    location: &dyn LocationProvider,
    keyword: &str,
) -> SearchOutcome {
    let (ticket, origin, timeout) = {
        let mut guard = session.lock().await;
        if guard.is_closed() {
            return SearchOutcome::Discarded;
        }
        let ticket = guard.begin_search(keyword);
        (ticket, guard.origin(location), guard.search_timeout())
    };

    if ticket.keyword().is_empty() {
        let mut guard = session.lock().await;
        return guard.apply_search(&ticket, Vec::new(), origin);
    }

    let request = SearchRequest {
        keyword: ticket.keyword().to_string(),
        origin,
        radius_meters: ticket.radius_meters(),
    };

    let cancel = ticket.cancellation();
    let hits = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("Search #{} cancelled before completion", ticket.generation());
            None
        }
        result = tokio::time::timeout(timeout, provider.search(&request)) => {
            let hits = match result {
                Ok(Ok(hits)) => hits,
                Ok(Err(e)) => {
                    warn!("Place search for '{}' failed: {}", request.keyword, e);
                    Vec::new()
                }
                Err(_) => {
                    warn!(
                        "Place search for '{}': {}",
                        request.keyword,
                        DecideError::Timeout(timeout)
                    );
                    Vec::new()
                }
            };
            Some(hits)
        }
    };

    let mut guard = session.lock().await;
    match hits {
        Some(hits) => guard.apply_search(&ticket, hits, origin),
        None if guard.is_closed() => SearchOutcome::Discarded,
        None => SearchOutcome::Superseded,
    }
}

/// Best-effort detail lookup; `None` on failure or timeout
pub async fn fetch_place_details(
    provider: &dyn PlaceDetailProvider,
    external_id: &str,
    timeout: Duration,
) -> Option<PlaceDetail> {
    match tokio::time::timeout(timeout, provider.fetch_details(external_id)).await {
        Ok(Ok(detail)) => detail,
        Ok(Err(e)) => {
            warn!("Place detail lookup for {} failed: {}", external_id, e);
            None
        }
        Err(_) => {
            warn!(
                "Place detail lookup for {}: {}",
                external_id,
                DecideError::Timeout(timeout)
            );
            None
        }
    }
}
