//! Display - the event loop behind the live scan view
//!
//! A single consumer drains the [`EventStream`] in arrival order and turns
//! every event into frame updates:
//!
//! - start events get a spinner line from the [`EventHandler`] and the loop
//!   moves on immediately;
//! - messages and finished-stage reports wait until every spinner above
//!   them has settled, so a summary never lands between moving spinners;
//! - an error event is drawn right away and ends the loop.
//!
//! Whatever ends the loop, cleanup runs once: leftover spinners are
//! stopped, a closing blank line is written, the cursor is restored, and a
//! recorded display error turns into a diagnostic plus a non-zero exit code.

use super::error::DisplayError;
use super::frame::Frame;
use super::handler::EventHandler;
use super::theme::Theme;
use crate::config::{ResultsTarget, UiConfig};
use scanview_bus::{DISPLAY_FAILURE_EXIT_CODE, EventKind, EventStream, Presenter};
use std::io::Write;
use std::time::Duration;

/// Diagnostic printed when the display recorded an error
pub const DISPLAY_FAILURE_MESSAGE: &str = "Failed to show the ui during the whole process";

/// Outcome of a full display run
#[derive(Debug, Default)]
pub struct RunResult {
    /// Last error recorded while rendering, if any
    pub display_error: Option<DisplayError>,
    /// Process exit code; 0 on success
    pub exit_code: i32,
}

impl RunResult {
    /// True if the process should exit successfully
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Terminate the process if the run failed; otherwise return.
    pub fn exit_if_failed(&self) {
        if self.exit_code > 0 {
            std::process::exit(self.exit_code);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Draining,
    Done,
}

/// Live terminal view of a scan pipeline
pub struct Display {
    theme: Theme,
    interval: Duration,
    frame_out: Box<dyn Write + Send>,
    results_out: Box<dyn Write + Send>,
    diagnostics: Box<dyn Write + Send>,
}

impl Display {
    /// Display drawing its frame on stderr, reports on the configured
    /// results stream, diagnostics on stderr
    pub fn new(config: &UiConfig) -> Self {
        let results_out: Box<dyn Write + Send> = match config.results {
            ResultsTarget::Stdout => Box::new(std::io::stdout()),
            ResultsTarget::Stderr => Box::new(std::io::stderr()),
        };
        Self {
            theme: config.theme(),
            interval: config.spinner_interval(),
            frame_out: Box::new(std::io::stderr()),
            results_out,
            diagnostics: Box::new(std::io::stderr()),
        }
    }

    /// Replace the output streams
    pub fn with_streams(
        mut self,
        frame: Box<dyn Write + Send>,
        results: Box<dyn Write + Send>,
        diagnostics: Box<dyn Write + Send>,
    ) -> Self {
        self.frame_out = frame;
        self.results_out = results;
        self.diagnostics = diagnostics;
        self
    }

    /// Consume events until a terminal event, an error, or the end of the
    /// stream, then terminate the process if the run failed.
    pub async fn display_events(self, events: EventStream) {
        self.run(events).await.exit_if_failed();
    }

    /// Consume events until a terminal event, an error, or the end of the
    /// stream, and report the outcome.
    #[allow(clippy::match_same_arms)]
    pub async fn run(self, mut events: EventStream) -> RunResult {
        let Self {
            theme,
            interval,
            frame_out,
            mut results_out,
            mut diagnostics,
        } = self;

        let frame = Frame::new(frame_out);
        if let Err(e) = frame.hide_cursor() {
            tracing::debug!(error = %e, "could not hide cursor");
        }

        let mut handler = EventHandler::new(theme.clone(), interval);
        let mut display_error: Option<DisplayError> = None;
        let mut exit_code = 0;
        let mut state = LoopState::Running;

        while state == LoopState::Running {
            let Some(event) = events.next().await else {
                tracing::debug!("event stream ended");
                break;
            };
            let (kind, terminal) = event.into_parts();
            tracing::debug!(event = kind.name(), terminal, "handling event");

            let mut stop = terminal;
            let mut failed: Option<DisplayError> = None;

            match kind {
                EventKind::VersionAvailable(text) => {
                    note(&mut failed, frame.append().render(&theme.version_notice(&text)));
                }
                EventKind::MessageDetected(text) | EventKind::ValidateSucceeded(text) => {
                    handler.wait().await;
                    note(&mut failed, frame.append().render(&theme.bold(&text)));
                }
                EventKind::ErrorDetected(err) => {
                    note(&mut failed, frame.append().render(&theme.error_line(&err.message)));
                    exit_code = match err.exit_code() {
                        0 => DISPLAY_FAILURE_EXIT_CODE,
                        code => code,
                    };
                    stop = true;
                }
                EventKind::PullImage(progress) => {
                    note(&mut failed, handler.pull_image(frame.append(), progress));
                }
                EventKind::CopyImage(progress) => {
                    note(&mut failed, handler.copy_image(frame.append(), progress));
                }
                EventKind::ReadImage(progress) => {
                    note(&mut failed, handler.read_image(frame.append(), progress));
                }
                EventKind::FetchImage(progress) => {
                    note(&mut failed, handler.fetch_image(frame.append(), progress));
                }
                EventKind::CatalogerStarted(progress) => {
                    note(&mut failed, handler.cataloger_started(frame.append(), progress));
                }
                EventKind::ScanStarted(progress) => {
                    note(&mut failed, handler.scan_started(frame.append(), progress));
                }
                EventKind::ScanFinished(presenter) | EventKind::ValidateWithViolations(presenter) => {
                    handler.wait().await;
                    show_report(&frame, &theme, presenter.as_ref(), results_out.as_mut(), &mut failed);
                }
                // Progress-only events, kept apart from the default arm so
                // they can grow their own rendering.
                EventKind::CatalogerFinished | EventKind::ReadLayer(_) => {}
                _ => {}
            }

            if let Some(err) = failed {
                tracing::debug!(error = %err, "render failed, stopping display");
                display_error = Some(err);
                stop = true;
            }
            if stop {
                state = LoopState::Draining;
            }
        }

        if state == LoopState::Draining {
            let discarded = events.drain();
            if discarded > 0 {
                tracing::debug!(discarded, "discarded events after display stopped");
            }
        }
        drop(events);

        // Spinners still running at this point belong to stages nobody will
        // summarize; stop them so they cannot draw below the closed frame.
        handler.cancel().await;
        if let Err(e) = frame.close() {
            tracing::debug!(error = %e, "could not close frame");
        }

        if let Some(err) = &display_error {
            let _ = writeln!(diagnostics, "{DISPLAY_FAILURE_MESSAGE}");
            let _ = diagnostics.flush();
            tracing::error!(error = %err, "{DISPLAY_FAILURE_MESSAGE}");
            if exit_code == 0 {
                exit_code = DISPLAY_FAILURE_EXIT_CODE;
            }
        }

        state = LoopState::Done;
        tracing::debug!(?state, exit_code, "display finished");
        RunResult {
            display_error,
            exit_code,
        }
    }
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("theme", &self.theme)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Blank line, title, blank line, the full report on the results stream,
/// then the footer when the presenter has one.
fn show_report(
    frame: &Frame,
    theme: &Theme,
    presenter: &dyn Presenter,
    results: &mut (dyn Write + Send),
    failed: &mut Option<DisplayError>,
) {
    frame.append();
    note(failed, frame.append().render(&theme.bold(&presenter.title())));
    frame.append();
    note(failed, frame.flush_pending());

    let presented = presenter
        .present(&mut *results)
        .and_then(|()| results.flush().map_err(anyhow::Error::from));
    if let Err(e) = presented {
        *failed = Some(DisplayError::Present(e));
    }

    let footer = presenter.footer();
    if !footer.is_empty() {
        note(failed, frame.append().render(&theme.bold(&footer)));
    }
}

// Last error wins; a later success never clears an earlier failure.
fn note<E: Into<DisplayError>>(slot: &mut Option<DisplayError>, result: Result<(), E>) {
    if let Err(e) = result {
        *slot = Some(e.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Capture;
    use scanview_bus::{ErrorEvent, Event, channel};

    fn display(frame: &Capture, results: &Capture, diagnostics: &Capture) -> Display {
        let config = UiConfig {
            color: false,
            spinner_interval_ms: 10,
            ..UiConfig::default()
        };
        Display::new(&config).with_streams(
            Box::new(frame.clone()),
            Box::new(results.clone()),
            Box::new(diagnostics.clone()),
        )
    }

    #[tokio::test]
    async fn test_terminal_event_ends_run_successfully() {
        let (frame, results, diag) = (Capture::default(), Capture::default(), Capture::default());
        let (publisher, events) = channel(8);
        publisher
            .publish(Event::terminal(EventKind::ValidateSucceeded("policy passed".into())))
            .await
            .unwrap();

        let result = display(&frame, &results, &diag).run(events).await;
        assert!(result.is_success());
        assert!(result.display_error.is_none());
        assert!(frame.contents().contains("policy passed"));
        assert!(frame.contents().ends_with("\u{1b}[?25h"));
        assert!(diag.contents().is_empty());
    }

    #[tokio::test]
    async fn test_error_event_sets_exit_code() {
        let (frame, results, diag) = (Capture::default(), Capture::default(), Capture::default());
        let (publisher, events) = channel(8);
        publisher
            .publish(Event::error(ErrorEvent::with_exit_code(74, "disk full")))
            .await
            .unwrap();

        let result = display(&frame, &results, &diag).run(events).await;
        assert_eq!(result.exit_code, 74);
        assert!(result.display_error.is_none());
        assert!(frame.contents().contains("[Error] disk full"));
    }

    #[tokio::test]
    async fn test_error_without_code_uses_fallback() {
        let (frame, results, diag) = (Capture::default(), Capture::default(), Capture::default());
        let (publisher, events) = channel(8);
        publisher
            .publish(Event::error(ErrorEvent::with_exit_code(0, "unknown")))
            .await
            .unwrap();

        let result = display(&frame, &results, &diag).run(events).await;
        assert_eq!(result.exit_code, DISPLAY_FAILURE_EXIT_CODE);
    }

    #[tokio::test]
    async fn test_stream_end_without_terminal_event() {
        let (frame, results, diag) = (Capture::default(), Capture::default(), Capture::default());
        let (publisher, events) = channel(8);
        publisher
            .publish(Event::new(EventKind::VersionAvailable("v2.0.0 is available".into())))
            .await
            .unwrap();
        drop(publisher);

        let result = display(&frame, &results, &diag).run(events).await;
        assert!(result.is_success());
        assert!(frame.contents().contains("v2.0.0 is available"));
    }

    #[test]
    fn test_note_keeps_last_error() {
        let mut slot = None;
        note::<DisplayError>(&mut slot, Ok(()));
        assert!(slot.is_none());
        note(&mut slot, Err(crate::ui::error::RenderError::Closed));
        note::<DisplayError>(&mut slot, Ok(()));
        assert!(slot.is_some());
    }
}
