//! Terminal Frame - Append-only lines with relative positioning
//!
//! The frame never repaints the screen. Lines are appended below each
//! other and any line can later be overwritten in place: the cursor
//! always rests just below the last row written, and a render moves up
//! relative to that position, draws, clears the rest of the row and
//! moves back down. Because nothing depends on absolute coordinates the
//! transcript still reads top to bottom when stderr is piped into a log.
//!
//! Lines that were appended but never rendered are emitted as blank rows
//! the first time a later line (or [`Frame::close`]) needs them.

use super::error::RenderError;
use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveDown, MoveToColumn, MoveUp, Show},
    terminal::{Clear, ClearType},
};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct FrameState {
    out: Box<dyn Write + Send>,
    lines: Vec<String>,
    // rows physically emitted; the cursor sits at column 0 of row `rows`
    rows: usize,
    cursor_hidden: bool,
    closed: bool,
}

impl FrameState {
    fn materialize(&mut self, upto: usize) -> std::io::Result<()> {
        while self.rows < upto {
            let text = &self.lines[self.rows];
            write!(self.out, "{text}")?;
            self.out.queue(Clear(ClearType::UntilNewLine))?;
            writeln!(self.out)?;
            self.rows += 1;
        }
        Ok(())
    }

    fn render(&mut self, index: usize, text: &str) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Closed);
        }
        self.lines[index] = text.replace(['\r', '\n'], " ");

        if index >= self.rows {
            self.materialize(index + 1)?;
        } else {
            let up = (self.rows - index) as u16;
            self.out.queue(MoveUp(up))?.queue(MoveToColumn(0))?;
            write!(self.out, "{}", self.lines[index])?;
            self.out
                .queue(Clear(ClearType::UntilNewLine))?
                .queue(MoveDown(up))?
                .queue(MoveToColumn(0))?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn set_cursor(&mut self, hidden: bool) -> Result<(), RenderError> {
        if self.cursor_hidden == hidden {
            return Ok(());
        }
        if hidden {
            self.out.queue(Hide)?;
        } else {
            self.out.queue(Show)?;
        }
        self.out.flush()?;
        self.cursor_hidden = hidden;
        Ok(())
    }
}

/// Append-only sequence of terminal lines
pub struct Frame {
    state: Arc<Mutex<FrameState>>,
}

impl Frame {
    /// Frame writing to `out`
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FrameState {
                out,
                lines: Vec::new(),
                rows: 0,
                cursor_hidden: false,
                closed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrameState> {
        lock(&self.state)
    }

    /// Hide the terminal cursor. Calling it again is a no-op.
    pub fn hide_cursor(&self) -> Result<(), RenderError> {
        self.lock().set_cursor(true)
    }

    /// Show the terminal cursor. Calling it again is a no-op.
    pub fn show_cursor(&self) -> Result<(), RenderError> {
        self.lock().set_cursor(false)
    }

    /// Append an empty line below every existing line. Nothing is written
    /// until the returned handle is rendered.
    pub fn append(&self) -> Line {
        let mut state = self.lock();
        state.lines.push(String::new());
        Line {
            state: Arc::clone(&self.state),
            index: state.lines.len() - 1,
        }
    }

    /// Emit every appended line that has not reached the terminal yet, so
    /// that output written around the frame lands below it.
    pub fn flush_pending(&self) -> Result<(), RenderError> {
        let mut state = self.lock();
        if state.closed {
            return Err(RenderError::Closed);
        }
        let upto = state.lines.len();
        state.materialize(upto)?;
        state.out.flush()?;
        Ok(())
    }

    /// Append a final blank line and restore the cursor. Both steps are
    /// attempted even if the first fails; the first error is returned.
    /// Later renders on any line fail with [`RenderError::Closed`].
    pub fn close(&self) -> Result<(), RenderError> {
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        state.lines.push(String::new());
        let upto = state.lines.len();
        let emitted = state
            .materialize(upto)
            .and_then(|()| state.out.flush())
            .map_err(RenderError::from);
        let shown = state.set_cursor(false);
        state.closed = true;
        emitted.and(shown)
    }

    /// Logical content of every line, in order
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// True while the cursor is hidden
    pub fn is_cursor_hidden(&self) -> bool {
        self.lock().cursor_hidden
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Frame")
            .field("lines", &state.lines.len())
            .field("rows", &state.rows)
            .field("cursor_hidden", &state.cursor_hidden)
            .field("closed", &state.closed)
            .finish()
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        // Panic or early-return paths must not leave the terminal without a cursor.
        let _ = self.lock().set_cursor(false);
    }
}

/// Handle to a single line of a [`Frame`]
#[derive(Clone)]
pub struct Line {
    state: Arc<Mutex<FrameState>>,
    index: usize,
}

impl Line {
    /// Overwrite this line with `text`. Other lines are untouched.
    /// Newlines in `text` are replaced with spaces.
    pub fn render(&self, text: &str) -> Result<(), RenderError> {
        lock(&self.state).render(self.index, text)
    }

    /// Position of this line in its frame
    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Debug for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line").field("index", &self.index).finish()
    }
}

// A panic while holding the lock leaves the state consistent enough to keep drawing.
fn lock(state: &Mutex<FrameState>) -> MutexGuard<'_, FrameState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Capture, FailingWriter};

    #[test]
    fn test_append_writes_nothing_until_render() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        let _line = frame.append();
        assert!(capture.contents().is_empty());
        assert_eq!(frame.lines(), [""]);
    }

    #[test]
    fn test_render_new_lines_in_order() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        frame.append().render("first").unwrap();
        frame.append().render("second").unwrap();

        let out = capture.contents();
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second);
        assert_eq!(frame.lines(), ["first", "second"]);
    }

    #[test]
    fn test_overwrite_moves_up_relative_to_bottom() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        let spinner = frame.append();
        spinner.render("pulling").unwrap();
        frame.append().render("message").unwrap();
        capture.clear();

        spinner.render("pulled").unwrap();
        let out = capture.contents();
        // two rows below the spinner line: up 2, draw, down 2
        assert!(out.contains("\u{1b}[2A"));
        assert!(out.contains("pulled"));
        assert!(out.contains("\u{1b}[2B"));
        assert_eq!(frame.lines(), ["pulled", "message"]);
    }

    #[test]
    fn test_skipped_lines_become_blank_rows() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        frame.append();
        frame.append().render("title").unwrap();
        let out = capture.contents();
        assert!(out.find('\n').unwrap() < out.find("title").unwrap());
        assert_eq!(frame.lines(), ["", "title"]);
    }

    #[test]
    fn test_newlines_are_flattened() {
        let frame = Frame::new(Box::new(Capture::default()));
        frame.append().render("a\nb\r\nc").unwrap();
        assert_eq!(frame.lines(), ["a b  c"]);
    }

    #[test]
    fn test_cursor_calls_are_idempotent() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        frame.hide_cursor().unwrap();
        frame.hide_cursor().unwrap();
        assert_eq!(capture.contents().matches("\u{1b}[?25l").count(), 1);
        assert!(frame.is_cursor_hidden());

        frame.show_cursor().unwrap();
        frame.show_cursor().unwrap();
        assert_eq!(capture.contents().matches("\u{1b}[?25h").count(), 1);
        assert!(!frame.is_cursor_hidden());
    }

    #[test]
    fn test_close_appends_blank_line_and_shows_cursor() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        frame.hide_cursor().unwrap();
        frame.append().render("done").unwrap();
        frame.close().unwrap();

        assert_eq!(frame.lines(), ["done", ""]);
        assert!(!frame.is_cursor_hidden());
        assert!(capture.contents().ends_with("\u{1b}[?25h"));
        assert!(matches!(
            frame.append().render("late"),
            Err(RenderError::Closed)
        ));
        // second close is a no-op
        frame.close().unwrap();
    }

    #[test]
    fn test_drop_restores_cursor() {
        let capture = Capture::default();
        let frame = Frame::new(Box::new(capture.clone()));
        frame.hide_cursor().unwrap();
        drop(frame);
        assert!(capture.contents().ends_with("\u{1b}[?25h"));
    }

    #[test]
    fn test_write_failure_is_render_error() {
        let frame = Frame::new(Box::new(FailingWriter));
        let err = frame.append().render("x").unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
        assert!(frame.hide_cursor().is_err());
        assert!(frame.close().is_err());
    }
}
