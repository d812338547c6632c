//! Disk I/O and file lifecycle.
//!
//! A per-job work directory holds one part file per chunk; the stitcher
//! concatenates them into the output file and the namer picks a free output
//! name beforehand.

mod naming;
mod stitch;

pub use naming::resolve_name;
pub use stitch::{stitch, StitchError};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::url_model::truncate_utf8;

/// Fixed folder under the temp root that holds every job's work directory.
pub const TEMP_FOLDER: &str = "fdl";

/// Suffix of per-chunk part files.
pub const PART_SUFFIX: &str = ".part";

/// Room left for the timestamp and chunk index in generated names.
const JOB_STEM_MAX: usize = 200;

/// Per-job temporary directory: `{temp_root}/fdl/{name}-{unix nanos}/`.
///
/// Created once by the job and removed once, after stitching (or after a
/// failure, depending on config).
#[derive(Debug, Clone)]
pub struct WorkDir {
    path: PathBuf,
    stem: String,
}

impl WorkDir {
    /// Creates a fresh work directory for the job whose output is `job_name`.
    /// Fails if the directory already exists.
    pub fn create(temp_root: &Path, job_name: &str) -> io::Result<Self> {
        let stem = truncate_utf8(job_name, JOB_STEM_MAX).to_string();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let parent = temp_root.join(TEMP_FOLDER);
        fs::create_dir_all(&parent)?;
        let path = parent.join(format!("{}-{}", stem, nanos));
        fs::create_dir(&path)?;
        tracing::debug!(path = %path.display(), "created work directory");
        Ok(WorkDir { path, stem })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Part file for chunk `index`: `{name}_{index}.part`.
    pub fn part_path(&self, index: usize) -> PathBuf {
        self.path
            .join(format!("{}_{}{}", self.stem, index, PART_SUFFIX))
    }

    /// Part files for chunks `0..count`, in index order.
    pub fn part_paths(&self, count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| self.part_path(i)).collect()
    }

    /// Recursively deletes the directory and every part file in it.
    pub fn remove(&self) -> io::Result<()> {
        fs::remove_dir_all(&self.path)?;
        tracing::debug!(path = %self.path.display(), "removed work directory");
        Ok(())
    }
}
