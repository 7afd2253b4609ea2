//! Shared helpers for display integration tests
//!
//! `Capture` and `FailingWriter` mirror `src/test_support.rs`; that module
//! is `#[cfg(test)]` and not visible to integration tests.
#![allow(dead_code)]

use scanview_bus::Presenter;
use scanview_cli::UiConfig;
use scanview_cli::ui::Display;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Cloneable in-memory writer; every clone appends to the same buffer.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer whose every write fails like a closed pipe.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

/// Output streams of one display run
#[derive(Clone, Default)]
pub struct Streams {
    pub frame: Capture,
    pub results: Capture,
    pub diagnostics: Capture,
}

impl Streams {
    pub fn display(&self) -> Display {
        Display::new(&plain_config()).with_streams(
            Box::new(self.frame.clone()),
            Box::new(self.results.clone()),
            Box::new(self.diagnostics.clone()),
        )
    }
}

pub fn plain_config() -> UiConfig {
    UiConfig {
        color: false,
        spinner_interval_ms: 10,
        ..UiConfig::default()
    }
}

/// Presenter with fixed texts that counts `present` calls
#[derive(Clone)]
pub struct FakePresenter {
    pub title: String,
    pub body: String,
    pub footer: String,
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FakePresenter {
    pub fn new(title: &str, footer: &str) -> Self {
        Self {
            title: title.to_string(),
            body: "CVE-2024-0001 openssl\n".to_string(),
            footer: footer.to_string(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Presenter for FakePresenter {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn present(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("report template missing");
        }
        out.write_all(self.body.as_bytes())?;
        Ok(())
    }

    fn footer(&self) -> String {
        self.footer.clone()
    }
}

/// Byte offset of the first occurrence of `needle`, panicking with the
/// captured output if it is missing.
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {haystack:?}"))
}
