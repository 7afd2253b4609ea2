//! Event types published by pipeline stages

use crate::error::ErrorCode;
use crate::presenter::Presenter;
use crate::progress::Progress;
use std::fmt;

/// Payload of an error event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Human-readable description
    pub message: String,
    exit_code: i32,
}

impl ErrorEvent {
    /// Error with a domain category
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_exit_code(code.exit_code(), message)
    }

    /// Error with an explicit process exit code. Negative codes are
    /// clamped to 0 (unset).
    pub fn with_exit_code(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: exit_code.max(0),
        }
    }

    /// Exit code carried by the event; 0 means unset.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Kind of event together with its payload
#[non_exhaustive]
pub enum EventKind {
    /// A newer release of the tool exists
    VersionAvailable(String),
    /// Informational message from a stage
    MessageDetected(String),
    /// Policy validation passed
    ValidateSucceeded(String),
    /// A stage failed; ends the display
    ErrorDetected(ErrorEvent),
    /// Image pull from a registry started
    PullImage(Progress),
    /// Image copy into the local store started
    CopyImage(Progress),
    /// Reading the image from disk started
    ReadImage(Progress),
    /// Fetching image metadata started
    FetchImage(Progress),
    /// Package cataloging started
    CatalogerStarted(Progress),
    /// Package cataloging finished
    CatalogerFinished,
    /// A single image layer was read
    ReadLayer(String),
    /// Vulnerability scan started
    ScanStarted(Progress),
    /// Vulnerability scan finished with a report
    ScanFinished(Box<dyn Presenter>),
    /// Policy validation finished with violations
    ValidateWithViolations(Box<dyn Presenter>),
}

impl EventKind {
    /// Stable kebab-case name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::VersionAvailable(_) => "version-available",
            Self::MessageDetected(_) => "message-detected",
            Self::ValidateSucceeded(_) => "validate-succeeded",
            Self::ErrorDetected(_) => "error-detected",
            Self::PullImage(_) => "pull-image",
            Self::CopyImage(_) => "copy-image",
            Self::ReadImage(_) => "read-image",
            Self::FetchImage(_) => "fetch-image",
            Self::CatalogerStarted(_) => "cataloger-started",
            Self::CatalogerFinished => "cataloger-finished",
            Self::ReadLayer(_) => "read-layer",
            Self::ScanStarted(_) => "scan-started",
            Self::ScanFinished(_) => "scan-finished",
            Self::ValidateWithViolations(_) => "validate-with-violations",
        }
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionAvailable(s)
            | Self::MessageDetected(s)
            | Self::ValidateSucceeded(s)
            | Self::ReadLayer(s) => f.debug_tuple(self.name()).field(s).finish(),
            Self::ErrorDetected(e) => f.debug_tuple(self.name()).field(e).finish(),
            Self::PullImage(p)
            | Self::CopyImage(p)
            | Self::ReadImage(p)
            | Self::FetchImage(p)
            | Self::CatalogerStarted(p)
            | Self::ScanStarted(p) => f.debug_tuple(self.name()).field(&p.snapshot()).finish(),
            Self::ScanFinished(p) | Self::ValidateWithViolations(p) => {
                f.debug_tuple(self.name()).field(&p.title()).finish()
            }
            Self::CatalogerFinished => f.write_str(self.name()),
        }
    }
}

/// A single unit of the event stream
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    terminal: bool,
}

impl Event {
    /// Non-terminal event
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            terminal: false,
        }
    }

    /// Event that ends the stream
    pub fn terminal(kind: EventKind) -> Self {
        Self {
            kind,
            terminal: true,
        }
    }

    /// Error event. Errors always end the stream.
    pub fn error(error: ErrorEvent) -> Self {
        Self::terminal(EventKind::ErrorDetected(error))
    }

    /// Borrow the kind
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// True if nothing should be consumed after this event
    pub fn is_end(&self) -> bool {
        self.terminal
    }

    /// Split into kind and terminal flag
    pub fn into_parts(self) -> (EventKind, bool) {
        (self.kind, self.terminal)
    }
}
