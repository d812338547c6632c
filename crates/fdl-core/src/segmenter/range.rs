//! Chunk type and range planning.

use thiserror::Error;

/// Inputs that cannot be turned into a chunk plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("chunk count must be greater than zero")]
    NoChunks,
    #[error("resource size is 0 bytes")]
    EmptyResource,
    #[error("{chunks} chunks cannot split a {size}-byte resource")]
    TooManyChunks { chunks: usize, size: u64 },
}

/// One contiguous byte range `[start, end]` (inclusive) of the resource.
///
/// `index` is the position in the output; stitching follows it, not
/// completion or directory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    /// Length of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Range value for libcurl / the `Range: bytes=` header: `start-end`.
    pub fn range_header_value(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Largest chunk count [`plan_chunks`] accepts for `total_size`.
pub fn max_chunks_for(total_size: u64) -> usize {
    usize::try_from(total_size.saturating_sub(1).max(1)).unwrap_or(usize::MAX)
}

/// Splits `[0, total_size)` into `chunk_count` contiguous chunks.
///
/// With `base = total_size / chunk_count`: chunk 0 is `[0, base]`, chunk `i`
/// is `[base*i + 1, base*i + base]`, and the last chunk runs from
/// `base*last + 1` to `total_size - 1`, absorbing the remainder. A single
/// chunk covers the whole resource.
pub fn plan_chunks(total_size: u64, chunk_count: usize) -> Result<Vec<Chunk>, PlanError> {
    if chunk_count == 0 {
        return Err(PlanError::NoChunks);
    }
    if total_size == 0 {
        return Err(PlanError::EmptyResource);
    }
    if chunk_count > max_chunks_for(total_size) {
        return Err(PlanError::TooManyChunks {
            chunks: chunk_count,
            size: total_size,
        });
    }

    let count = chunk_count as u64;
    let base = total_size / count;
    let last = count - 1;

    let chunks = (0..count)
        .map(|i| {
            let start = if i == 0 { 0 } else { base * i + 1 };
            let end = if i == last { total_size - 1 } else { base * i + base };
            Chunk {
                index: i as usize,
                start,
                end,
            }
        })
        .collect();
    Ok(chunks)
}
