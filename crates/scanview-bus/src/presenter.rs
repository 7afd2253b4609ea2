//! Presenter trait for result reports
//!
//! Finished-stage events carry a presenter so the display can print a
//! full report without knowing how it is formatted.

use std::io::Write;

/// Formats a finished stage's results (vulnerability report, policy
/// violations, ...)
pub trait Presenter: Send + Sync {
    /// Heading rendered on its own frame line before the report.
    fn title(&self) -> String;

    /// Write the full multi-line report to `out`.
    fn present(&self, out: &mut dyn Write) -> anyhow::Result<()>;

    /// Closing line rendered after the report. An empty string means no
    /// footer line is drawn.
    fn footer(&self) -> String {
        String::new()
    }
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn title(&self) -> String {
        (**self).title()
    }
    fn present(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        (**self).present(out)
    }
    fn footer(&self) -> String {
        (**self).footer()
    }
}
