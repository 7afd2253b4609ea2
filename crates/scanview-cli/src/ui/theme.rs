//! UI Theme - Design system constants
//!
//! Colors and icons used by the scan display, plus the small set of line
//! formatters every render goes through. Centralizing these keeps spinner
//! lines, summaries and error lines visually consistent, and lets the
//! whole display fall back to plain text when color is disabled.

use crossterm::style::{Color, Stylize};
use scanview_bus::ProgressState;

/// Theme for the scan display
#[derive(Debug, Clone)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Status icons
    pub icons: Icons,
    /// Emit ANSI styling
    pub color: bool,
}

impl Theme {
    /// Theme without any styling, for logs and non-color terminals
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold text, used for messages, titles and footers
    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Release notice line
    pub fn version_notice(&self, text: &str) -> String {
        self.paint(text, self.colors.notice)
    }

    /// `[Error] message` with a colored tag
    pub fn error_line(&self, message: &str) -> String {
        format!("{} {message}", self.paint("[Error]", self.colors.error))
    }

    /// Spinner line for a stage that is still running
    pub fn active_line(&self, title: &str, state: &ProgressState, spinner: &str) -> String {
        let mut line = format!(
            "{} {title} {}",
            self.paint(spinner, self.colors.active),
            state.label
        );
        if !state.stage.is_empty() {
            line.push(' ');
            line.push_str(&self.paint(&state.stage, self.colors.secondary));
        }
        let counter = format_counter(state.current, state.total);
        if !counter.is_empty() {
            line.push(' ');
            line.push_str(&self.paint(&counter, self.colors.secondary));
        }
        line
    }

    /// Final line for a stage that completed
    pub fn success_line(&self, title: &str, label: &str) -> String {
        format!(
            "{} {title} {label}",
            self.paint(self.icons.success, self.colors.success)
        )
    }

    /// Final line for a stage that failed or whose producer went away
    pub fn failure_line(&self, title: &str, label: &str, reason: &str) -> String {
        format!(
            "{} {title} {label} {}",
            self.paint(self.icons.error, self.colors.error),
            self.paint(reason, self.colors.error)
        )
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            icons: Icons::default(),
            color: true,
        }
    }
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// New release notices
    pub notice: Color,
    /// Sub-steps and counters
    pub secondary: Color,
    /// Success states
    pub success: Color,
    /// Error states
    pub error: Color,
    /// Active/in-progress items
    pub active: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            notice: Color::Magenta,
            secondary: Color::DarkGrey,
            success: Color::Green,
            error: Color::Red,
            active: Color::Cyan,
        }
    }
}

/// Status icons for different states
#[derive(Debug, Clone)]
pub struct Icons {
    /// Success/completed state (✓)
    pub success: &'static str,
    /// Error/failed state (✗)
    pub error: &'static str,
    /// Spinner animation frames
    pub spinner: &'static [&'static str],
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            error: "✗",
            spinner: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
        }
    }
}

/// Format `current/total`, or a bare count when the total is unknown.
/// Nothing is shown before the first unit of work.
pub fn format_counter(current: u64, total: Option<u64>) -> String {
    match total.filter(|&t| t > 0) {
        Some(t) => format!("[{}/{t}]", current.min(t)),
        None if current > 0 => format!("[{current}]"),
        None => String::new(),
    }
}
