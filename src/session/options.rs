//! List-of-options decision session
//!
//! The full option list is persisted under the `options` key after every
//! mutation, including weight changes from feedback.

use super::events::{EventBroadcaster, SessionEvent, SessionKind};
use super::state::{SelectionSlot, SessionState};
use crate::error::{DecideError, Result};
use crate::feedback::{Feedback, FeedbackEngine};
use crate::filter::{self, CandidateFilter, TagFilter};
use crate::selection::SelectionEngine;
use crate::storage::{BlobStore, CandidateStore, OPTIONS_KEY};
use crate::types::{CandidateId, DecisionOption, Weight};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Split a comma-separated tag string, trimming and dropping empties
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct OptionSession {
    options: Vec<DecisionOption>,
    tag_filter: TagFilter,
    selection: SelectionSlot<DecisionOption>,
    engine: SelectionEngine,
    store: CandidateStore<DecisionOption>,
    events: EventBroadcaster,
}

impl OptionSession {
    /// Open a session over the persisted option list
    pub fn open(blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_engine(blobs, SelectionEngine::new())
    }

    pub fn with_engine(blobs: Arc<dyn BlobStore>, engine: SelectionEngine) -> Self {
        let store = CandidateStore::new(blobs, OPTIONS_KEY);
        let options = store.load();
        info!("Option session opened with {} options", options.len());

        Self {
            options,
            tag_filter: TagFilter::new(),
            selection: SelectionSlot::new(),
            engine,
            store,
            events: EventBroadcaster::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn options(&self) -> &[DecisionOption] {
        &self.options
    }

    pub fn get(&self, id: CandidateId) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Add an option from a name and a comma-separated tag string
    pub fn add_option(&mut self, name: &str, tags_csv: &str) -> Result<CandidateId> {
        self.add_option_with_tags(name, parse_tags(tags_csv))
    }

    pub fn add_option_with_tags(&mut self, name: &str, tags: Vec<String>) -> Result<CandidateId> {
        if name.trim().is_empty() {
            return Err(DecideError::InvalidInput("option name is empty".to_string()));
        }

        let option = DecisionOption::new(name, tags);
        let id = option.id;
        debug!(
            "Adding option '{}' with tags {:?}",
            option.name, option.tags
        );
        self.options.push(option);
        self.commit();
        Ok(id)
    }

    /// Remove an option; false if it was not present
    pub fn remove_option(&mut self, id: CandidateId) -> bool {
        let before = self.options.len();
        self.options.retain(|o| o.id != id);
        let removed = self.options.len() != before;
        if removed {
            self.commit();
        }
        removed
    }

    pub fn clear_options(&mut self) {
        self.options.clear();
        self.commit();
    }

    pub fn all_tags(&self) -> Vec<String> {
        filter::all_tags(&self.options)
    }

    pub fn tag_filter(&self) -> &TagFilter {
        &self.tag_filter
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let selected = self.tag_filter.toggle(tag);
        self.filters_changed();
        selected
    }

    pub fn clear_tag_filter(&mut self) {
        self.tag_filter.clear();
        self.filters_changed();
    }

    /// Options passing the current tag filter
    pub fn filtered(&self) -> Vec<&DecisionOption> {
        self.tag_filter.apply(&self.options)
    }

    /// Pick one eligible option; `None` leaves the session idle
    pub fn decide(&mut self) -> Option<&DecisionOption> {
        let chosen = {
            let eligible = self.tag_filter.apply(&self.options);
            self.engine.decide(&eligible).cloned()
        };

        match chosen {
            Some(option) => {
                debug!("Decided on option '{}'", option.name);
                self.events.emit(SessionEvent::decided(
                    SessionKind::Options,
                    option.id.to_string(),
                    option.name.clone(),
                ));
                self.selection.select(option);
                self.selection.current()
            }
            None => {
                debug!("No eligible options to decide between");
                self.events
                    .emit(SessionEvent::no_candidate(SessionKind::Options));
                None
            }
        }
    }

    pub fn selected(&self) -> Option<&DecisionOption> {
        self.selection.current()
    }

    pub fn state(&self) -> SessionState {
        self.selection.state()
    }

    /// Record that the selection is on screen
    pub fn mark_presented(&mut self) -> bool {
        self.selection.mark_presented()
    }

    /// Feedback on the current selection, then back to idle
    ///
    /// Returns the new weight, `None` when idle or when the option has since
    /// been removed.
    pub fn feedback(&mut self, feedback: impl Into<Feedback>) -> Option<Weight> {
        let selected = self.selection.take()?;
        self.adjust_weight(selected.id, feedback.into())
    }

    /// Feedback on a specific option by id, independent of the selection
    pub fn adjust_weight(&mut self, id: CandidateId, feedback: Feedback) -> Option<Weight> {
        let weight = FeedbackEngine::apply(&mut self.options, &id, feedback);
        match weight {
            Some(weight) => {
                self.store.save(&self.options);
                self.events.emit(SessionEvent::feedback_applied(
                    SessionKind::Options,
                    id.to_string(),
                    feedback.is_liked(),
                    weight.get(),
                ));
            }
            None => debug!("Feedback target {} no longer present", id),
        }
        weight
    }

    /// Clear the selection without any weight change
    pub fn dismiss(&mut self) {
        if self.selection.take().is_some() {
            self.events
                .emit(SessionEvent::selection_cleared(SessionKind::Options));
        }
    }

    fn commit(&mut self) {
        self.store.save(&self.options);
        self.events.emit(SessionEvent::candidates_changed(
            SessionKind::Options,
            self.options.len(),
        ));
    }

    fn filters_changed(&self) {
        let eligible = self.filtered().len();
        self.events
            .emit(SessionEvent::filters_changed(SessionKind::Options, eligible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn session() -> (OptionSession, Arc<dyn BlobStore>) {
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let session = OptionSession::with_engine(Arc::clone(&blobs), SelectionEngine::seeded(5));
        (session, blobs)
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("cheap, fast ,, spicy"),
            vec!["cheap", "fast", "spicy"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let (mut session, _) = session();
        assert!(matches!(
            session.add_option("   ", "cheap"),
            Err(DecideError::InvalidInput(_))
        ));
        assert!(session.options().is_empty());
    }

    #[test]
    fn test_add_persists_immediately() {
        let (mut session, blobs) = session();
        session.add_option("Pizza", "cheap, fast").unwrap();

        let reopened = OptionSession::open(blobs);
        assert_eq!(reopened.options().len(), 1);
        assert_eq!(reopened.options()[0].tags, vec!["cheap", "fast"]);
        assert_eq!(reopened.options()[0].weight, Weight::MIN);
    }

    #[test]
    fn test_remove_and_clear() {
        let (mut session, blobs) = session();
        let pizza = session.add_option("Pizza", "").unwrap();
        session.add_option("Sushi", "").unwrap();

        assert!(session.remove_option(pizza));
        assert!(!session.remove_option(pizza));
        assert_eq!(session.options().len(), 1);

        session.clear_options();
        assert!(OptionSession::open(blobs).options().is_empty());
    }

    #[test]
    fn test_decide_empty_stays_idle() {
        let (mut session, _) = session();
        assert!(session.decide().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_decide_respects_tag_filter() {
        let (mut session, _) = session();
        session.add_option("Pizza", "cheap, fast").unwrap();
        session.add_option("Steak", "slow").unwrap();
        session.toggle_tag("cheap");

        for _ in 0..20 {
            assert_eq!(session.decide().unwrap().name, "Pizza");
        }
    }

    #[test]
    fn test_feedback_clears_selection_and_persists() {
        let (mut session, blobs) = session();
        session.add_option("Pizza", "").unwrap();

        session.decide();
        session.mark_presented();
        assert_eq!(session.state(), SessionState::AwaitingFeedback);

        assert_eq!(session.feedback(true).map(Weight::get), Some(2));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(OptionSession::open(blobs).options()[0].weight.get(), 2);
    }

    #[test]
    fn test_feedback_when_idle_is_noop() {
        let (mut session, _) = session();
        session.add_option("Pizza", "").unwrap();
        assert!(session.feedback(true).is_none());
        assert_eq!(session.options()[0].weight, Weight::MIN);
    }

    #[test]
    fn test_feedback_after_removal_is_noop() {
        let (mut session, _) = session();
        session.add_option("Pizza", "").unwrap();
        session.add_option("Sushi", "").unwrap();

        session.decide();
        let chosen = session.selected().unwrap().id;
        session.remove_option(chosen);
        let before = session.options().to_vec();

        // Snapshot is still displayable
        assert!(session.selected().is_some());
        assert!(session.feedback(Feedback::Liked).is_none());
        assert_eq!(session.options(), &before[..]);
    }

    #[test]
    fn test_dismiss_keeps_weight() {
        let (mut session, _) = session();
        session.add_option("Pizza", "").unwrap();
        session.decide();
        session.dismiss();

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.options()[0].weight, Weight::MIN);
    }

    #[test]
    fn test_events_emitted() {
        let (mut session, _) = session();
        let mut rx = session.subscribe();

        session.add_option("Pizza", "").unwrap();
        session.decide();

        use crate::session::events::EventType;
        assert!(matches!(
            rx.try_recv().unwrap().event_type,
            EventType::CandidatesChanged { count: 1, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap().event_type,
            EventType::Decided { .. }
        ));
    }
}
