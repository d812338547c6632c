//! Ordered concatenation of part files into the output file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("create {path}: {source}", path = .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("open part {path}: {source}", path = .path.display())]
    OpenPart {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("append part {path}: {source}", path = .path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("flush {path}: {source}", path = .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates (or truncates) `output_path` and appends every part in slice
/// order. Returns the number of bytes written.
///
/// `parts` must already be in chunk-index order. Each part is closed before
/// the next is opened. On error the partially written output is left as is.
pub fn stitch(output_path: &Path, parts: &[PathBuf]) -> Result<u64, StitchError> {
    let out = File::create(output_path).map_err(|source| StitchError::Create {
        path: output_path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(out);
    let mut written = 0u64;

    for part in parts {
        let mut reader = File::open(part).map_err(|source| StitchError::OpenPart {
            path: part.clone(),
            source,
        })?;
        written += io::copy(&mut reader, &mut writer).map_err(|source| StitchError::Append {
            path: part.clone(),
            source,
        })?;
    }

    let flush_err = |source: io::Error| StitchError::Flush {
        path: output_path.to_path_buf(),
        source,
    };
    writer.flush().map_err(flush_err)?;
    writer
        .into_inner()
        .map_err(|e| flush_err(e.into_error()))?
        .sync_all()
        .map_err(flush_err)?;

    tracing::debug!(path = %output_path.display(), parts = parts.len(), written, "stitched");
    Ok(written)
}
