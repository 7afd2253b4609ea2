//! scanview-bus - Shared event vocabulary
//!
//! Pipeline stages (fetch, catalog, scan, validate) publish [`Event`]s
//! through a [`Publisher`]; the display drains them from the matching
//! [`EventStream`]. The crate carries no rendering logic of its own.

pub mod channel;
pub mod error;
pub mod event;
pub mod presenter;
pub mod progress;

// Re-exports
pub use channel::{DEFAULT_CAPACITY, EventStream, PublishError, Publisher, channel};
pub use error::{DISPLAY_FAILURE_EXIT_CODE, ErrorCode};
pub use event::{ErrorEvent, Event, EventKind};
pub use presenter::Presenter;
pub use progress::{Progress, ProgressState};
