//! Event handler for long-running stages
//!
//! Start events (image pull, cataloging, scanning, ...) get a spinner line
//! that keeps animating while the display loop moves on to later events.
//! Each spinner runs as its own tokio task, follows the stage's
//! [`Progress`], draws a settled line once the stage finishes, and ends.
//! The tasks are tracked by a [`CompletionBarrier`] so summary lines can
//! wait for every spinner above them to settle.

use super::barrier::CompletionBarrier;
use super::error::RenderError;
use super::frame::Line;
use super::spinner::Spinner;
use super::theme::Theme;
use scanview_bus::{Progress, ProgressState};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Long-running stage announced by a start event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PullImage,
    CopyImage,
    ReadImage,
    FetchImage,
    Catalog,
    Scan,
}

impl Stage {
    /// Title while the stage runs
    pub fn active_title(self) -> &'static str {
        match self {
            Self::PullImage => "Pulling image",
            Self::CopyImage => "Copying image",
            Self::ReadImage => "Reading image",
            Self::FetchImage => "Fetching image",
            Self::Catalog => "Cataloging packages",
            Self::Scan => "Scanning image",
        }
    }

    /// Title once the stage completed
    pub fn done_title(self) -> &'static str {
        match self {
            Self::PullImage => "Pulled image",
            Self::CopyImage => "Copied image",
            Self::ReadImage => "Read image",
            Self::FetchImage => "Fetched image",
            Self::Catalog => "Cataloged packages",
            Self::Scan => "Scanned image",
        }
    }
}

/// Registers spinner sub-tasks for start events
#[derive(Debug)]
pub struct EventHandler {
    barrier: CompletionBarrier,
    theme: Theme,
    interval: Duration,
}

impl EventHandler {
    /// Handler drawing with `theme`, redrawing spinners every `interval`
    pub fn new(theme: Theme, interval: Duration) -> Self {
        Self {
            barrier: CompletionBarrier::new(),
            theme,
            interval: interval.max(Duration::from_millis(10)),
        }
    }

    pub fn pull_image(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::PullImage, line, progress)
    }

    pub fn copy_image(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::CopyImage, line, progress)
    }

    pub fn read_image(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::ReadImage, line, progress)
    }

    pub fn fetch_image(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::FetchImage, line, progress)
    }

    pub fn cataloger_started(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::Catalog, line, progress)
    }

    pub fn scan_started(&mut self, line: Line, progress: Progress) -> Result<(), RenderError> {
        self.register(Stage::Scan, line, progress)
    }

    /// Draw the first spinner frame on `line`, then hand the line to a
    /// background task and return without waiting for the stage.
    ///
    /// The returned error only covers that first draw; failures inside
    /// the task are logged when the barrier joins it.
    pub fn register(
        &mut self,
        stage: Stage,
        line: Line,
        progress: Progress,
    ) -> Result<(), RenderError> {
        let mut updates = progress.subscribe();
        // The spinner must not keep the producer side alive.
        drop(progress);

        let spinner = Spinner::new(self.theme.icons.spinner, self.interval);
        let state = updates.borrow_and_update().clone();
        line.render(&self.theme.active_line(stage.active_title(), &state, spinner.current()))?;

        tracing::debug!(?stage, label = %state.label, line = line.index(), "spinner registered");
        let task = animate(stage, line, updates, self.theme.clone(), spinner, self.interval);
        self.barrier.register(tokio::spawn(task));
        Ok(())
    }

    /// Wait for every registered spinner to settle
    pub async fn wait(&mut self) {
        self.barrier.wait().await;
    }

    /// Abort spinners that are still running
    pub async fn cancel(&mut self) {
        self.barrier.cancel().await;
    }

    /// Number of spinners still running
    pub fn outstanding(&self) -> usize {
        self.barrier.outstanding()
    }
}

async fn animate(
    stage: Stage,
    line: Line,
    mut updates: watch::Receiver<ProgressState>,
    theme: Theme,
    spinner: Spinner,
    interval: Duration,
) -> Result<(), RenderError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let state = updates.borrow_and_update().clone();
        if state.is_finished() {
            return line.render(&settled_line(&theme, stage, &state));
        }
        line.render(&theme.active_line(stage.active_title(), &state, spinner.current()))?;

        tokio::select! {
            _ = ticker.tick() => {}
            changed = updates.changed() => {
                if changed.is_err() {
                    let state = updates.borrow().clone();
                    tracing::debug!(?stage, label = %state.label, "progress producer went away");
                    return line.render(&settled_line(&theme, stage, &state));
                }
            }
        }
    }
}

fn settled_line(theme: &Theme, stage: Stage, state: &ProgressState) -> String {
    if state.completed {
        theme.success_line(stage.done_title(), &state.label)
    } else if let Some(reason) = &state.error {
        theme.failure_line(stage.active_title(), &state.label, &format!("failed: {reason}"))
    } else {
        theme.failure_line(stage.active_title(), &state.label, "interrupted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Capture;
    use crate::ui::frame::Frame;

    fn handler() -> EventHandler {
        EventHandler::new(Theme::plain(), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_spinner_settles_on_completion() {
        let frame = Frame::new(Box::new(Capture::default()));
        let mut handler = handler();
        let progress = Progress::new("alpine:3.19");

        handler.pull_image(frame.append(), progress.clone()).unwrap();
        assert!(frame.lines()[0].contains("Pulling image alpine:3.19"));

        progress.complete();
        handler.wait().await;
        assert_eq!(frame.lines(), ["✓ Pulled image alpine:3.19"]);
        assert_eq!(handler.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_spinner_reports_failure() {
        let frame = Frame::new(Box::new(Capture::default()));
        let mut handler = handler();
        let progress = Progress::new("registry.local/app");

        handler.fetch_image(frame.append(), progress.clone()).unwrap();
        progress.fail("unauthorized");
        handler.wait().await;
        assert_eq!(
            frame.lines(),
            ["✗ Fetching image registry.local/app failed: unauthorized"]
        );
    }

    #[tokio::test]
    async fn test_spinner_ends_when_producer_drops() {
        let frame = Frame::new(Box::new(Capture::default()));
        let mut handler = handler();
        let progress = Progress::new("app");

        handler.scan_started(frame.append(), progress.clone()).unwrap();
        drop(progress);
        handler.wait().await;
        assert_eq!(frame.lines(), ["✗ Scanning image app interrupted"]);
    }

    #[tokio::test]
    async fn test_register_returns_immediately() {
        let frame = Frame::new(Box::new(Capture::default()));
        let mut handler = handler();
        let progress = Progress::new("app");

        handler.cataloger_started(frame.append(), progress.clone()).unwrap();
        handler.copy_image(frame.append(), progress.clone()).unwrap();
        assert_eq!(handler.outstanding(), 2);

        handler.cancel().await;
        assert_eq!(handler.outstanding(), 0);
        drop(progress);
    }

    #[tokio::test]
    async fn test_first_draw_failure_is_returned() {
        let frame = Frame::new(Box::new(Capture::default()));
        let line = frame.append();
        frame.close().unwrap();

        let mut handler = handler();
        let err = handler.read_image(line, Progress::new("app")).unwrap_err();
        assert!(matches!(err, RenderError::Closed));
        assert_eq!(handler.outstanding(), 0);
    }

    #[test]
    fn test_stage_titles() {
        assert_eq!(Stage::Catalog.active_title(), "Cataloging packages");
        assert_eq!(Stage::Catalog.done_title(), "Cataloged packages");
        assert_eq!(Stage::ReadImage.done_title(), "Read image");
    }
}
