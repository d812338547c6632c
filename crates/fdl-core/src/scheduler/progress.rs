//! Progress aggregation for a running job.
//!
//! A tokio task samples the size of every part file on a fixed interval,
//! derives per-chunk speed from the growth since the previous sample, and
//! publishes an aggregate snapshot to a watch channel and the job sink. It
//! never touches the fetch workers; the part files on disk are the only
//! shared state.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::sink::JobSink;
use crate::size_fmt::format_size;

/// Bytes seen for one chunk so far and during the last interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkProgress {
    pub bytes_downloaded: u64,
    pub bytes_per_interval: u64,
}

impl ChunkProgress {
    /// Takes a new on-disk size reading.
    pub fn record(&mut self, size_now: u64) {
        self.bytes_per_interval = size_now.saturating_sub(self.bytes_downloaded);
        self.bytes_downloaded = size_now;
    }
}

/// Aggregate progress of a job at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub bytes_downloaded: u64,
    pub bytes_per_second: u64,
    pub total_size: u64,
    pub chunk_count: usize,
}

impl ProgressSnapshot {
    /// `bytes_downloaded / total_size`, unclamped.
    pub fn fraction(&self) -> f64 {
        if self.total_size == 0 {
            return 0.0;
        }
        self.bytes_downloaded as f64 / self.total_size as f64
    }

    /// Percentage for display, clamped to `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        (self.fraction() * 100.0).clamp(0.0, 100.0)
    }

    /// `(D:{speed}/s | T:{downloaded}/{total} | C:{chunks} | P:{percent}%)`
    pub fn line(&self) -> String {
        format!(
            "(D:{}/s | T:{}/{} | C:{} | P:{:.2}%)",
            format_size(self.bytes_per_second),
            format_size(self.bytes_downloaded),
            format_size(self.total_size),
            self.chunk_count,
            self.percentage()
        )
    }
}

/// Reads part file sizes and keeps one [`ChunkProgress`] per chunk.
#[derive(Debug)]
pub struct ProgressSampler {
    parts: Vec<PathBuf>,
    chunks: Vec<ChunkProgress>,
    total_size: u64,
    interval: Duration,
}

impl ProgressSampler {
    /// `parts` in chunk-index order; `interval` is the expected time between
    /// samples, used to scale bytes per interval to bytes per second.
    pub fn new(parts: Vec<PathBuf>, total_size: u64, interval: Duration) -> Self {
        let chunks = vec![ChunkProgress::default(); parts.len()];
        Self {
            parts,
            chunks,
            total_size,
            interval,
        }
    }

    pub fn chunks(&self) -> &[ChunkProgress] {
        &self.chunks
    }

    /// Samples every part file (a file not created yet counts as empty).
    pub fn sample(&mut self) -> ProgressSnapshot {
        for (progress, path) in self.chunks.iter_mut().zip(&self.parts) {
            let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            progress.record(size);
        }
        let downloaded: u64 = self.chunks.iter().map(|c| c.bytes_downloaded).sum();
        let per_interval: u64 = self.chunks.iter().map(|c| c.bytes_per_interval).sum();
        let millis = self.interval.as_millis().max(1) as u64;
        ProgressSnapshot {
            bytes_downloaded: downloaded,
            bytes_per_second: per_interval.saturating_mul(1000) / millis,
            total_size: self.total_size,
            chunk_count: self.parts.len(),
        }
    }
}

/// Running aggregator; call [`AggregatorHandle::finish`] once the fetch is over.
pub struct AggregatorHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<(ProgressSampler, watch::Sender<ProgressSnapshot>)>,
    sink: Arc<dyn JobSink>,
}

impl AggregatorHandle {
    /// Stops the ticker, takes one final sample, publishes and emits it.
    pub async fn finish(self) -> Result<ProgressSnapshot, JoinError> {
        let _ = self.stop.send(());
        let (mut sampler, tx) = self.task.await?;
        let snapshot = sampler.sample();
        tx.send_replace(snapshot);
        self.sink.progress(&snapshot);
        Ok(snapshot)
    }
}

/// Starts sampling every `interval`. The first sample is taken one interval
/// after the call.
pub fn spawn_aggregator(
    mut sampler: ProgressSampler,
    interval: Duration,
    sink: Arc<dyn JobSink>,
    tx: watch::Sender<ProgressSnapshot>,
) -> AggregatorHandle {
    let (stop, mut stop_rx) = oneshot::channel::<()>();
    let task_sink = Arc::clone(&sink);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let snapshot = sampler.sample();
                    tx.send_replace(snapshot);
                    task_sink.progress(&snapshot);
                }
            }
        }
        (sampler, tx)
    });
    AggregatorHandle { stop, task, sink }
}
