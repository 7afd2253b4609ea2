//! Display errors

use thiserror::Error;

/// A write to the terminal frame failed
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame is already closed")]
    Closed,
}

/// Error recorded by the display loop and acted upon at cleanup
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to show scan results: {0:#}")]
    Present(anyhow::Error),
}
