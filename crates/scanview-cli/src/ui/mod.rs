//! UI Module - Live terminal view of a scan pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Producers  │  (pull, catalog, scan, validate stages)
//! └──────┬──────┘
//!        │ publish events
//!        ▼
//! ┌─────────────┐
//! │   Display   │  Single consumer, dispatches by event kind
//! └──────┬──────┘
//!        │ start events            │ messages, reports, errors
//!        ▼                         ▼
//! ┌─────────────┐          ┌─────────────┐
//! │   Handler   │─spinner─▶│    Frame    │  Append-only terminal lines
//! └──────┬──────┘  tasks   └─────────────┘
//!        │ registers
//!        ▼
//! ┌─────────────┐
//! │   Barrier   │  Joined before every summary render
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`display`] - The event loop and its cleanup
//! - [`frame`] - Append-only lines with in-place overwrite
//! - [`handler`] - Spinner sub-tasks for start events
//! - [`barrier`] - Tracks and joins spinner sub-tasks
//! - [`spinner`] - Time-based spinner animation
//! - [`theme`] - Colors, icons and line formatting
//! - [`error`] - Render and display errors
//!
//! # Example
//!
//! ```no_run
//! use scanview_bus::{Event, EventKind, channel};
//! use scanview_cli::{UiConfig, ui::Display};
//!
//! # async fn run() {
//! let (publisher, events) = channel(64);
//! tokio::spawn(async move {
//!     let _ = publisher
//!         .publish(Event::terminal(EventKind::ValidateSucceeded("policy passed".into())))
//!         .await;
//! });
//!
//! let result = Display::new(&UiConfig::default()).run(events).await;
//! assert!(result.is_success());
//! # }
//! ```

pub mod barrier;
pub mod display;
pub mod error;
pub mod frame;
pub mod handler;
pub mod spinner;
pub mod theme;

// Re-export main types for convenience
pub use barrier::CompletionBarrier;
pub use display::{Display, RunResult};
pub use error::{DisplayError, RenderError};
pub use frame::{Frame, Line};
pub use handler::{EventHandler, Stage};
pub use theme::Theme;
