//! Parallel chunk fetching.
//!
//! One OS thread per chunk, each running a blocking curl Range GET into its
//! own part file. The first failure raises a shared abort flag so sibling
//! transfers stop early; every thread is joined before returning.

mod segment;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use thiserror::Error;

use crate::segmenter::Chunk;
use crate::storage::WorkDir;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("chunk {index}: transport error: {source}")]
    Transport {
        index: usize,
        #[source]
        source: curl::Error,
    },
    #[error("chunk {index}: HTTP status {status}")]
    Http { index: usize, status: u32 },
    #[error("chunk {index}: received {received} of {expected} bytes")]
    PartialTransfer {
        index: usize,
        expected: u64,
        received: u64,
    },
    #[error("chunk {index}: server sent more than the {expected} bytes requested (Range ignored?)")]
    Overrun { index: usize, expected: u64 },
    #[error("chunk {index}: write {path}: {source}", path = .path.display())]
    Storage {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("chunk {index}: stopped after another chunk failed")]
    Aborted { index: usize },
    #[error("chunk {index}: failed to start worker thread: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("chunk {index}: worker panicked")]
    WorkerPanicked { index: usize },
}

impl FetchError {
    fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted { .. })
    }
}

/// Fetches every chunk of `url` concurrently into `work_dir`.
///
/// Returns the part file paths in chunk-index order. On failure the first
/// real error is returned (sibling `Aborted` results are only reported if
/// nothing else failed); part files are left for the caller to clean up.
pub fn fetch_chunks(
    url: &str,
    chunks: &[Chunk],
    work_dir: &WorkDir,
) -> Result<Vec<PathBuf>, FetchError> {
    let abort = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<(usize, Result<(), FetchError>)>();
    let mut handles = Vec::with_capacity(chunks.len());
    let mut first_error: Option<FetchError> = None;

    for chunk in chunks.iter().copied() {
        let tx = tx.clone();
        let abort_flag = Arc::clone(&abort);
        let url = url.to_string();
        let part_path = work_dir.part_path(chunk.index);
        let spawned = thread::Builder::new()
            .name(format!("fdl-chunk-{}", chunk.index))
            .spawn(move || {
                let res = segment::fetch_one_chunk(&url, &chunk, &part_path, &abort_flag);
                if res.is_err() {
                    abort_flag.store(true, Ordering::Relaxed);
                }
                let _ = tx.send((chunk.index, res));
            });
        match spawned {
            Ok(h) => handles.push((chunk.index, h)),
            Err(source) => {
                abort.store(true, Ordering::Relaxed);
                first_error = Some(FetchError::Spawn {
                    index: chunk.index,
                    source,
                });
                break;
            }
        }
    }
    drop(tx);

    tracing::debug!(url, chunks = handles.len(), "chunk workers started");

    // Every sender is owned by a worker, so the loop ends once all have
    // finished or died.
    for (index, res) in rx {
        match res {
            Ok(()) => tracing::trace!(index, "chunk complete"),
            Err(e) => {
                abort.store(true, Ordering::Relaxed);
                tracing::debug!(index, error = %e, "chunk failed");
                let replace = match &first_error {
                    None => true,
                    Some(prev) => prev.is_abort() && !e.is_abort(),
                };
                if replace {
                    first_error = Some(e);
                }
            }
        }
    }

    for (index, h) in handles {
        if h.join().is_err() && first_error.as_ref().map_or(true, FetchError::is_abort) {
            first_error = Some(FetchError::WorkerPanicked { index });
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(chunks.iter().map(|c| work_dir.part_path(c.index)).collect()),
    }
}
