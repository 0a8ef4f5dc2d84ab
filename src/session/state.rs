//! Selection state machine shared by all decision sessions
//!
//! ```text
//! Idle --decide (eligible non-empty)--> HasSelection --presented--> AwaitingFeedback
//!   ^                                        |                            |
//!   +---------- feedback / dismiss ----------+----------------------------+
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No current selection
    Idle,
    /// A candidate has been chosen
    HasSelection,
    /// The choice is on screen and feedback may arrive
    AwaitingFeedback,
}

/// Holds a snapshot of the chosen candidate
///
/// The snapshot outlives removal of the candidate from its collection, so the
/// result stays displayable; feedback then finds no target and is a no-op.
#[derive(Debug, Clone)]
pub struct SelectionSlot<T> {
    current: Option<T>,
    presented: bool,
}

impl<T> Default for SelectionSlot<T> {
    fn default() -> Self {
        Self {
            current: None,
            presented: false,
        }
    }
}

impl<T> SelectionSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (&self.current, self.presented) {
            (None, _) => SessionState::Idle,
            (Some(_), false) => SessionState::HasSelection,
            (Some(_), true) => SessionState::AwaitingFeedback,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Replace any previous selection
    pub fn select(&mut self, candidate: T) {
        self.current = Some(candidate);
        self.presented = false;
    }

    /// Record that the selection is being shown; false when idle
    pub fn mark_presented(&mut self) -> bool {
        if self.current.is_some() {
            self.presented = true;
        }
        self.presented
    }

    /// Clear and hand back the selection, returning to idle
    pub fn take(&mut self) -> Option<T> {
        self.presented = false;
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut slot: SelectionSlot<&str> = SelectionSlot::new();
        assert_eq!(slot.state(), SessionState::Idle);
        assert!(!slot.mark_presented());
        assert_eq!(slot.state(), SessionState::Idle);

        slot.select("Pizza");
        assert_eq!(slot.state(), SessionState::HasSelection);

        assert!(slot.mark_presented());
        assert_eq!(slot.state(), SessionState::AwaitingFeedback);

        assert_eq!(slot.take(), Some("Pizza"));
        assert_eq!(slot.state(), SessionState::Idle);
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_reselect_resets_presentation() {
        let mut slot = SelectionSlot::new();
        slot.select(1);
        slot.mark_presented();
        slot.select(2);
        assert_eq!(slot.state(), SessionState::HasSelection);
        assert_eq!(slot.current(), Some(&2));
    }
}
