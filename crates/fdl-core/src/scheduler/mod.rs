//! Job driver.
//!
//! Runs the download pipeline for one job:
//! resolver → fetch_head → segmenter → downloader (+ progress aggregator) →
//! storage stitch → work directory removal.

mod job;
pub mod progress;
mod run;

pub use job::{JobReport, JobRequest, JobState};
pub use progress::{ChunkProgress, ProgressSnapshot};
pub use run::{format_elapsed, run_job};
