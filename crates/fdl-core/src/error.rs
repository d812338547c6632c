//! Job-level error type.
//!
//! Each pipeline stage has its own error enum; `JobError` wraps whichever
//! stage failed so callers can match on the stage and still print the cause.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::downloader::FetchError;
use crate::fetch_head::ResolveError;
use crate::segmenter::PlanError;
use crate::storage::StitchError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("resolve failed: {0}")]
    Resolution(#[from] ResolveError),
    #[error("invalid chunk layout: {0}")]
    Planning(#[from] PlanError),
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("stitch failed: {0}")]
    Stitch(#[from] StitchError),
    #[error("no usable file name (candidate {candidate:?})")]
    EmptyName { candidate: String },
    #[error("work directory {path}: {source}", path = .path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output directory {path}: {source}", path = .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} task panicked")]
    Join(&'static str),
}

impl JobError {
    /// Short stage name for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            JobError::Resolution(_) => "resolve",
            JobError::Planning(_) => "plan",
            JobError::Fetch(_) => "fetch",
            JobError::Stitch(_) => "stitch",
            JobError::EmptyName { .. } => "name",
            JobError::WorkDir { .. } => "workdir",
            JobError::OutputDir { .. } => "output",
            JobError::Join(_) => "join",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_stage_errors() {
        let e: JobError = PlanError::NoChunks.into();
        assert_eq!(e.stage(), "plan");
        assert!(e.to_string().starts_with("invalid chunk layout"));

        let e: JobError = FetchError::Http { index: 2, status: 503 }.into();
        assert_eq!(e.stage(), "fetch");
        assert_eq!(e.to_string(), "download failed: chunk 2: HTTP status 503");

        let e: JobError = ResolveError::MissingSize {
            url: "http://h/x".into(),
        }
        .into();
        assert!(matches!(e, JobError::Resolution(ResolveError::MissingSize { .. })));
    }

    #[test]
    fn empty_name_is_not_a_layout_error() {
        let e = JobError::EmptyName {
            candidate: "???".into(),
        };
        assert_eq!(e.stage(), "name");
        assert_eq!(e.to_string(), "no usable file name (candidate \"???\")");
    }

    #[test]
    fn join_message() {
        assert_eq!(JobError::Join("stitch").to_string(), "stitch task panicked");
    }
}
