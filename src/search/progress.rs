//! Progress and status reporting for rebuild runs.
//!
//! A run reports to at most two independent sinks: a [`ProgressSink`]
//! (the job queue's progress slot) and a [`MessageSink`] (a console). Either
//! may be absent. Every status message is also emitted as a `tracing` event,
//! so a run without sinks still leaves a log trail.

use std::sync::Mutex;

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Sink traits
// ---------------------------------------------------------------------------

/// Job-tracking progress slot.
pub trait ProgressSink {
    fn set_progress(&self, done: u64, total: u64);
}

/// Human-readable output channel.
pub trait MessageSink {
    fn write_line(&self, text: &str);

    fn update_progress(&self, done: u64, total: u64);

    /// Error lines default to ordinary lines.
    fn write_error(&self, text: &str) {
        self.write_line(text);
    }
}

// ---------------------------------------------------------------------------
// ProgressReporter
// ---------------------------------------------------------------------------

/// Fans progress and status messages out to the registered sinks.
#[derive(Default, Clone, Copy)]
pub struct ProgressReporter<'a> {
    progress: Option<&'a dyn ProgressSink>,
    messages: Option<&'a dyn MessageSink>,
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("progress", &self.progress.is_some())
            .field("messages", &self.messages.is_some())
            .finish()
    }
}

impl<'a> ProgressReporter<'a> {
    pub fn new(
        progress: Option<&'a dyn ProgressSink>,
        messages: Option<&'a dyn MessageSink>,
    ) -> Self {
        Self { progress, messages }
    }

    /// A reporter with no sinks; only `tracing` output remains.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, done: u64, total: u64) {
        if let Some(sink) = self.messages {
            sink.update_progress(done, total);
        }
        if let Some(sink) = self.progress {
            sink.set_progress(done, total);
        }
    }

    pub fn message(&self, text: &str) {
        info!("{text}");
        if let Some(sink) = self.messages {
            sink.write_line(text);
        }
    }

    pub fn error(&self, text: &str) {
        error!("{text}");
        if let Some(sink) = self.messages {
            sink.write_error(text);
        }
    }
}

// ---------------------------------------------------------------------------
// ConsoleSink
// ---------------------------------------------------------------------------

/// Terminal output: an indicatif progress bar with status lines printed
/// above it. In quiet mode the bar is hidden and only errors are printed.
pub struct ConsoleSink {
    bar: ProgressBar,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
            );
            bar
        };
        Self { bar, quiet }
    }

    /// Clear the bar once a run has ended.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl MessageSink for ConsoleSink {
    fn write_line(&self, text: &str) {
        if !self.quiet {
            self.bar.println(text);
        }
    }

    fn update_progress(&self, done: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(done);
    }

    fn write_error(&self, text: &str) {
        let line = style(text).red().bold().to_string();
        if self.quiet {
            let _ = Term::stderr().write_line(&line);
        } else {
            self.bar.println(line);
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// A sink that records every call, usable as both sink kinds.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    progress: Mutex<Vec<(u64, u64)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn progress(&self) -> Vec<(u64, u64)> {
        self.progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl MessageSink for RecordingSink {
    fn write_line(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }

    fn update_progress(&self, done: u64, total: u64) {
        self.set_progress(done, total);
    }

    fn write_error(&self, text: &str) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

impl ProgressSink for RecordingSink {
    fn set_progress(&self, done: u64, total: u64) {
        self.progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((done, total));
    }
}
