//! Progress monitors for long-running pipeline stages
//!
//! A [`Progress`] is created by the stage that does the work and travels
//! inside the stage's start event. The display subscribes to it and keeps
//! a spinner line alive until the stage reports completion or failure.
//!
//! Dropping every producer-side clone without finishing closes the
//! underlying channel; subscribers treat that as the end of the stage, so
//! a crashed producer can never keep a spinner running forever.

use std::sync::Arc;
use tokio::sync::watch;

/// Point-in-time view of a stage's progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    /// Subject of the stage, usually the image reference
    pub label: String,
    /// Free-form sub-step ("resolving manifest", "layer 3/7", ...)
    pub stage: String,
    /// Units processed so far
    pub current: u64,
    /// Expected units, if known
    pub total: Option<u64>,
    /// Set once the stage succeeded
    pub completed: bool,
    /// Set once the stage failed
    pub error: Option<String>,
}

impl ProgressState {
    /// True once the stage has either completed or failed.
    pub fn is_finished(&self) -> bool {
        self.completed || self.error.is_some()
    }
}

/// Shared, cloneable progress handle
#[derive(Debug, Clone)]
pub struct Progress {
    tx: Arc<watch::Sender<ProgressState>>,
}

impl Progress {
    /// Start tracking a stage for `label`
    pub fn new(label: impl Into<String>) -> Self {
        let state = ProgressState {
            label: label.into(),
            ..ProgressState::default()
        };
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Describe the current sub-step
    pub fn set_stage(&self, stage: impl Into<String>) {
        let stage = stage.into();
        self.update(|s| s.stage = stage);
    }

    /// Record the expected amount of work
    pub fn set_total(&self, total: u64) {
        self.update(|s| s.total = Some(total));
    }

    /// Record `n` more units of work done
    pub fn advance(&self, n: u64) {
        self.update(|s| s.current = s.current.saturating_add(n));
    }

    /// Mark the stage as successfully finished
    pub fn complete(&self) {
        self.update(|s| {
            if let Some(total) = s.total {
                s.current = total;
            }
            s.completed = true;
        });
    }

    /// Mark the stage as failed
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.update(|s| s.error = Some(reason));
    }

    /// Current state
    pub fn snapshot(&self) -> ProgressState {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every change
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    // Finished states are sticky: late updates are dropped.
    fn update(&self, f: impl FnOnce(&mut ProgressState)) {
        self.tx.send_if_modified(|state| {
            if state.is_finished() {
                return false;
            }
            f(state);
            true
        });
    }
}
