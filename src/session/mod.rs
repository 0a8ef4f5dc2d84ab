//! Decision sessions, one per feature
//!
//! Each session exclusively owns its candidate collection and orchestrates
//! filter, selection and feedback over it:
//! - [`OptionSession`]: persisted option list with tag filtering
//! - [`PlaceSession`]: search results with rating/distance filtering and
//!   learned weight history
//! - [`MarkSession`]: ephemeral marks on a single image
//!
//! Sessions are single-owner values. Share a place session across tasks via
//! [`SharedPlaceSession`], which serializes every mutation behind a mutex.

pub mod events;
pub mod marks;
pub mod options;
pub mod places;
pub mod state;

pub use events::{EventBroadcaster, EventType, SessionEvent, SessionKind};
pub use marks::MarkSession;
pub use options::{parse_tags, OptionSession};
pub use places::{
    fetch_place_details, search_places, PlaceSession, SearchOutcome, SearchTicket,
    SharedPlaceSession,
};
pub use state::{SelectionSlot, SessionState};
