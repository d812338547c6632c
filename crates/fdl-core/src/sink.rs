//! Observability sink for a download job.
//!
//! The driver reports human-readable lines (start, progress, completion,
//! failure) through a [`JobSink`]; the default implementation forwards them
//! to `tracing`.

use std::sync::Mutex;

use crate::scheduler::ProgressSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
    Fatal,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Error => "error",
            Level::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Receives a job's lines. Called from the driver task and the progress
/// aggregator task, hence `Send + Sync`.
pub trait JobSink: Send + Sync {
    /// Called once before anything else is emitted for `job`.
    fn open(&self, _job: &str) {}

    fn emit(&self, level: Level, line: &str);

    /// One aggregator tick. Defaults to a `Debug` line.
    fn progress(&self, snapshot: &ProgressSnapshot) {
        self.emit(Level::Debug, &snapshot.line());
    }

    /// Called once when the job is over, success or not.
    fn close(&self) {}
}

/// Forwards every line to `tracing` under the `fdl_core::sink` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl JobSink for TracingSink {
    fn open(&self, job: &str) {
        tracing::debug!(job, "job opened");
    }

    fn emit(&self, level: Level, line: &str) {
        match level {
            Level::Debug => tracing::debug!("{}", line),
            Level::Info => tracing::info!("{}", line),
            Level::Error => tracing::error!("{}", line),
            Level::Fatal => tracing::error!(fatal = true, "{}", line),
        }
    }
}

/// Records lines in memory. Useful for tests and for callers that want to
/// inspect what a job reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
    opened: Mutex<Option<String>>,
    closed: Mutex<bool>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines at exactly `level`.
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, s)| s)
            .collect()
    }

    pub fn opened_job(&self) -> Option<String> {
        self.opened.lock().ok().and_then(|o| o.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }
}

impl JobSink for MemorySink {
    fn open(&self, job: &str) {
        if let Ok(mut o) = self.opened.lock() {
            *o = Some(job.to_string());
        }
    }

    fn emit(&self, level: Level, line: &str) {
        if let Ok(mut l) = self.lines.lock() {
            l.push((level, line.to_string()));
        }
    }

    fn close(&self) {
        if let Ok(mut c) = self.closed.lock() {
            *c = true;
        }
    }
}
