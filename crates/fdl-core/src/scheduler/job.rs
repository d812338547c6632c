//! Job lifecycle types.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

use super::progress::ProgressSnapshot;

/// Lifecycle of a single download.
///
/// `Created → Resolving → Planned → Fetching → Fetched → Stitching → Complete`,
/// with `Failed` reachable from `Resolving`, `Fetching` and `Stitching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Resolving,
    Planned,
    Fetching,
    Fetched,
    Stitching,
    Complete,
    Failed,
}

impl JobState {
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, Resolving)
                | (Resolving, Planned)
                | (Resolving, Failed)
                | (Planned, Fetching)
                | (Fetching, Fetched)
                | (Fetching, Failed)
                | (Fetched, Stitching)
                | (Stitching, Complete)
                | (Stitching, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::Resolving => "resolving",
            JobState::Planned => "planned",
            JobState::Fetching => "fetching",
            JobState::Fetched => "fetched",
            JobState::Stitching => "stitching",
            JobState::Complete => "complete",
            JobState::Failed => "failed",
        }
    }
}

/// What the caller asks for.
#[derive(Debug)]
pub struct JobRequest {
    /// Direct URL, or a page URL a registered resolver understands.
    pub url: String,
    pub output_dir: PathBuf,
    /// Overrides the derived file name (still sanitized). Blank means derive.
    pub file_name_hint: Option<String>,
    /// Overrides the configured chunk count.
    pub chunks: Option<usize>,
    /// Receives every progress snapshot while the job runs.
    pub progress: Option<watch::Sender<ProgressSnapshot>>,
}

impl JobRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            file_name_hint: None,
            chunks: None,
            progress: None,
        }
    }

    /// Subscribes to this job's progress. The receiver sees the resolved
    /// size and chunk count once planning is done, then one snapshot per
    /// aggregator tick, then the final one.
    pub fn watch_progress(&mut self) -> watch::Receiver<ProgressSnapshot> {
        match &self.progress {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(ProgressSnapshot::default());
                self.progress = Some(tx);
                rx
            }
        }
    }

    /// The hint, unless it is missing or blank.
    pub(super) fn usable_hint(&self) -> Option<&str> {
        self.file_name_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// A resolved and planned job. Built once resolution succeeds; `state`
/// only moves forward.
#[derive(Debug)]
pub(crate) struct DownloadJob {
    pub source_url: String,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub total_size: u64,
    pub chunk_count: usize,
    pub(super) state: JobState,
}

impl DownloadJob {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    pub(super) fn advance(&mut self, next: JobState) {
        advance(&mut self.state, next);
    }
}

/// Moves `state` to `next`, logging the edge.
pub(super) fn advance(state: &mut JobState, next: JobState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal job transition {:?} -> {:?}",
        state,
        next
    );
    tracing::debug!(from = state.as_str(), to = next.as_str(), "job state");
    *state = next;
}

/// Outcome of a successful job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub output_path: PathBuf,
    pub total_size: u64,
    pub chunk_count: usize,
    pub elapsed: Duration,
    pub progress: ProgressSnapshot,
}
