//! Image-marks decision session
//!
//! Marks live only for one image-marking task and are never persisted.

use super::events::{EventBroadcaster, SessionEvent, SessionKind};
use super::state::{SelectionSlot, SessionState};
use crate::feedback::{Feedback, FeedbackEngine};
use crate::selection::SelectionEngine;
use crate::types::{CandidateId, ImageMark, Point, Weight};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MarkSession {
    marks: Vec<ImageMark>,
    selection: SelectionSlot<ImageMark>,
    engine: SelectionEngine,
    events: EventBroadcaster,
}

impl MarkSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: SelectionEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn marks(&self) -> &[ImageMark] {
        &self.marks
    }

    /// Sequence number the next mark will get: max existing + 1, or 1
    pub fn next_numeric_id(&self) -> u32 {
        self.marks
            .iter()
            .map(|m| m.numeric_id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Add a mark at an image-space position
    pub fn add_mark(&mut self, position: Point) -> &ImageMark {
        let mark = ImageMark::new(self.next_numeric_id(), position);
        debug!(
            "Added {} at ({}, {})",
            mark.display_name, position.x, position.y
        );
        self.marks.push(mark);
        self.candidates_changed();
        &self.marks[self.marks.len() - 1]
    }

    pub fn remove_mark(&mut self, id: CandidateId) -> bool {
        let before = self.marks.len();
        self.marks.retain(|m| m.id != id);
        let removed = self.marks.len() != before;
        if removed {
            self.candidates_changed();
        }
        removed
    }

    /// Rename a mark; any string is accepted, including empty
    pub fn rename_mark(&mut self, id: CandidateId, name: &str) -> bool {
        match self.marks.iter_mut().find(|m| m.id == id) {
            Some(mark) => {
                mark.display_name = name.to_string();
                self.candidates_changed();
                true
            }
            None => false,
        }
    }

    /// Remove every mark and any selection
    pub fn clear_marks(&mut self) {
        self.marks.clear();
        self.selection.take();
        self.candidates_changed();
    }

    pub fn decide(&mut self) -> Option<&ImageMark> {
        let chosen = {
            let eligible: Vec<&ImageMark> = self.marks.iter().collect();
            self.engine.decide(&eligible).cloned()
        };

        match chosen {
            Some(mark) => {
                self.events.emit(SessionEvent::decided(
                    SessionKind::Marks,
                    mark.id.to_string(),
                    mark.display_name.clone(),
                ));
                self.selection.select(mark);
                self.selection.current()
            }
            None => {
                self.events
                    .emit(SessionEvent::no_candidate(SessionKind::Marks));
                None
            }
        }
    }

    pub fn selected(&self) -> Option<&ImageMark> {
        self.selection.current()
    }

    pub fn state(&self) -> SessionState {
        self.selection.state()
    }

    pub fn mark_presented(&mut self) -> bool {
        self.selection.mark_presented()
    }

    pub fn feedback(&mut self, feedback: impl Into<Feedback>) -> Option<Weight> {
        let selected = self.selection.take()?;
        let feedback = feedback.into();
        let weight = FeedbackEngine::apply(&mut self.marks, &selected.id, feedback)?;
        self.events.emit(SessionEvent::feedback_applied(
            SessionKind::Marks,
            selected.id.to_string(),
            feedback.is_liked(),
            weight.get(),
        ));
        Some(weight)
    }

    pub fn dismiss(&mut self) {
        if self.selection.take().is_some() {
            self.events
                .emit(SessionEvent::selection_cleared(SessionKind::Marks));
        }
    }

    fn candidates_changed(&self) {
        self.events.emit(SessionEvent::candidates_changed(
            SessionKind::Marks,
            self.marks.len(),
        ));
    }
}
