//! Console output for jobs started from the CLI.

use fdl_core::scheduler::ProgressSnapshot;
use fdl_core::sink::{JobSink, Level, TracingSink};

/// Prints start/done/progress lines to the terminal and forwards everything
/// to the log file through [`TracingSink`].
pub struct ConsoleSink {
    prefix: String,
    inner: TracingSink,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            inner: TracingSink,
        }
    }

    /// Prefixes every printed line with `[label] `, for concurrent list jobs.
    pub fn labelled(label: &str) -> Self {
        Self {
            prefix: format!("[{}] ", label),
            inner: TracingSink,
        }
    }

    fn format(&self, line: &str) -> String {
        format!("{}{}", self.prefix, line)
    }
}

impl JobSink for ConsoleSink {
    fn open(&self, job: &str) {
        self.inner.open(job);
    }

    fn emit(&self, level: Level, line: &str) {
        self.inner.emit(level, line);
        match level {
            Level::Debug => {}
            Level::Info => println!("{}", self.format(line)),
            Level::Error | Level::Fatal => eprintln!("{}", self.format(line)),
        }
    }

    fn progress(&self, snapshot: &ProgressSnapshot) {
        self.inner.progress(snapshot);
        println!("{}", self.format(&snapshot.line()));
    }

    fn close(&self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefix() {
        assert_eq!(ConsoleSink::new().format("Done"), "Done");
        assert_eq!(ConsoleSink::labelled("3").format("Done"), "[3] Done");
    }
}
