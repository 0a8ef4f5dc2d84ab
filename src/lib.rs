//! Decider - weighted random decisions that learn from feedback
//!
//! Picks one of a set of weighted alternatives at random, subject to user
//! filters, and shifts future odds based on accept/reject feedback:
//! - Weight-proportional random selection with an injectable random source
//! - Tag filters for options, rating/distance filters for places
//! - Feedback that adjusts a single integer weight, never below 1
//! - Best-effort persistence of learned weights across sessions
//!
//! # Architecture
//!
//! - **Types**: candidates ([`DecisionOption`], [`Place`], [`ImageMark`]) and [`Weight`]
//! - **Storage**: key-value blob stores and the place weight history
//! - **Filter / Selection / Feedback**: the decision engine proper
//! - **Session**: per-feature orchestration, state machine and change events
//! - **Providers**: traits for place search, place details and location
//!
//! # Example
//!
//! ```no_run
//! use decider_core::{FileBlobStore, OptionSession};
//! use std::sync::Arc;
//!
//! let blobs = Arc::new(FileBlobStore::new("/tmp/decider"));
//! let mut session = OptionSession::open(blobs);
//!
//! session.add_option("Pizza", "cheap, fast")?;
//! session.add_option("Sushi", "fish")?;
//!
//! if let Some(choice) = session.decide() {
//!     println!("Tonight: {}", choice.name);
//! }
//! session.feedback(true);
//! # Ok::<(), decider_core::DecideError>(())
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod providers;
pub mod selection;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigError, DeciderConfig, PlacesConfig, StorageConfig};
pub use error::{DecideError, Result};
pub use feedback::{Feedback, FeedbackEngine};
pub use filter::{CandidateFilter, PlaceFilter, TagFilter};
pub use providers::{
    FixedLocation, LocationProvider, PlaceDetail, PlaceDetailProvider, PlaceSearchProvider,
    SearchHit, SearchRequest,
};
pub use selection::{combined_score, SelectionEngine, SelectionMode};
pub use session::{
    MarkSession, OptionSession, PlaceSession, SearchOutcome, SessionEvent, SessionState,
    SharedPlaceSession,
};
pub use storage::{BlobStore, CandidateStore, FileBlobStore, MemoryBlobStore, WeightHistory};
pub use types::{
    Candidate, CandidateId, Coordinate, DecisionOption, ImageMark, Place, Point, Weight,
};
