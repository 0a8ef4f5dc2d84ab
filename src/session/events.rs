//! Session change notifications
//!
//! Every observable mutation of a session (collection, filters, selection,
//! weights) is published on a broadcast channel. Sessions stay queryable
//! directly; events only say that something changed and what.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Which decision feature emitted the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Options,
    Places,
    Marks,
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    /// Candidate collection changed (add, remove, clear, rename)
    CandidatesChanged {
        count: usize,
        timestamp: DateTime<Utc>,
    },
    /// Active filter criteria changed
    FiltersChanged {
        eligible: usize,
        timestamp: DateTime<Utc>,
    },
    /// A candidate was selected
    Decided {
        key: String,
        label: String,
        timestamp: DateTime<Utc>,
    },
    /// Decide was requested with nothing eligible
    NoCandidate {
        timestamp: DateTime<Utc>,
    },
    /// Weight adjusted after feedback
    FeedbackApplied {
        key: String,
        liked: bool,
        weight: u32,
        timestamp: DateTime<Utc>,
    },
    /// Selection cleared without a weight change
    SelectionCleared {
        timestamp: DateTime<Utc>,
    },
    /// Search results replaced the place list
    SearchApplied {
        keyword: String,
        count: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Event wrapper with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session: SessionKind,
    #[serde(flatten)]
    pub event_type: EventType,
}

impl SessionEvent {
    pub fn new(session: SessionKind, event_type: EventType) -> Self {
        Self {
            session,
            event_type,
        }
    }

    pub fn candidates_changed(session: SessionKind, count: usize) -> Self {
        Self::new(
            session,
            EventType::CandidatesChanged {
                count,
                timestamp: Utc::now(),
            },
        )
    }

    pub fn filters_changed(session: SessionKind, eligible: usize) -> Self {
        Self::new(
            session,
            EventType::FiltersChanged {
                eligible,
                timestamp: Utc::now(),
            },
        )
    }

    pub fn decided(session: SessionKind, key: String, label: String) -> Self {
        Self::new(
            session,
            EventType::Decided {
                key,
                label,
                timestamp: Utc::now(),
            },
        )
    }

    pub fn no_candidate(session: SessionKind) -> Self {
        Self::new(
            session,
            EventType::NoCandidate {
                timestamp: Utc::now(),
            },
        )
    }

    pub fn feedback_applied(session: SessionKind, key: String, liked: bool, weight: u32) -> Self {
        Self::new(
            session,
            EventType::FeedbackApplied {
                key,
                liked,
                weight,
                timestamp: Utc::now(),
            },
        )
    }

    pub fn selection_cleared(session: SessionKind) -> Self {
        Self::new(
            session,
            EventType::SelectionCleared {
                timestamp: Utc::now(),
            },
        )
    }

    pub fn search_applied(session: SessionKind, keyword: String, count: usize) -> Self {
        Self::new(
            session,
            EventType::SearchApplied {
                keyword,
                count,
                timestamp: Utc::now(),
            },
        )
    }
}

/// Fan-out of session events to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBroadcaster {
    /// Create new broadcaster with channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to current subscribers; having none is fine
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let events = EventBroadcaster::default();
        assert_eq!(events.subscriber_count(), 0);
        events.emit(SessionEvent::no_candidate(SessionKind::Options));
    }

    #[test]
    fn test_subscriber_receives_event() {
        let events = EventBroadcaster::default();
        let mut rx = events.subscribe();

        events.emit(SessionEvent::candidates_changed(SessionKind::Marks, 3));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.session, SessionKind::Marks);
        assert!(matches!(
            event.event_type,
            EventType::CandidatesChanged { count: 3, .. }
        ));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = SessionEvent::feedback_applied(SessionKind::Places, "abc".to_string(), true, 4);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["session"], "places");
        assert_eq!(json["type"], "feedback_applied");
        assert_eq!(json["weight"], 4);
    }
}
