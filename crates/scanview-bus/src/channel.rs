//! In-process event channel
//!
//! Many publishers, exactly one stream. Order is the order in which
//! publishes complete; the stream never reorders.

use crate::event::Event;
use thiserror::Error;
use tokio::sync::mpsc;

/// Default number of events buffered between producers and the display
pub const DEFAULT_CAPACITY: usize = 64;

/// Publishing failed because the consuming side is gone
#[derive(Error, Debug)]
pub enum PublishError {
    /// The stream was dropped; carries the kind of the lost event
    #[error("event stream closed, dropped {0} event")]
    Closed(&'static str),
}

/// Create a connected publisher/stream pair
pub fn channel(capacity: usize) -> (Publisher, EventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Publisher { tx }, EventStream { rx })
}

/// Cloneable producer side
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: mpsc::Sender<Event>,
}

impl Publisher {
    /// Publish an event, waiting for buffer space if needed
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Closed`] once the stream has been dropped.
    pub async fn publish(&self, event: Event) -> Result<(), PublishError> {
        let name = event.kind().name();
        self.tx
            .send(event)
            .await
            .map_err(|_| PublishError::Closed(name))
    }

    /// True once the stream has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single-consumer side
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
}

impl EventStream {
    /// Next event, or `None` once every publisher is dropped and the
    /// buffer is empty
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Discard whatever is already buffered without waiting for more.
    /// Returns the number of discarded events.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
