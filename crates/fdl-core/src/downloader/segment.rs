//! Single-chunk HTTP Range GET streamed into the chunk's part file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::FetchError;
use crate::segmenter::Chunk;

/// Downloads `chunk` from `url` into `part_path` (created or truncated).
///
/// The transfer stops early when `abort` is raised by a failing sibling, or
/// when the server sends more bytes than the chunk holds (range ignored).
pub(super) fn fetch_one_chunk(
    url: &str,
    chunk: &Chunk,
    part_path: &Path,
    abort: &AtomicBool,
) -> Result<(), FetchError> {
    let index = chunk.index;
    let expected = chunk.len();
    let storage_err = |source: std::io::Error| FetchError::Storage {
        index,
        path: part_path.to_path_buf(),
        source,
    };
    let transport = |source: curl::Error| FetchError::Transport { index, source };

    let file = File::create(part_path).map_err(storage_err)?;
    let mut writer = BufWriter::new(file);
    let mut received = 0u64;
    let mut write_error: Option<std::io::Error> = None;
    let mut overrun = false;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.range(&chunk.range_header_value()).map_err(transport)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if abort.load(Ordering::Relaxed) {
                    return Ok(0);
                }
                if received + data.len() as u64 > expected {
                    overrun = true;
                    return Ok(0);
                }
                match writer.write_all(data) {
                    Ok(()) => {
                        received += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_error = Some(e);
                        Ok(0)
                    }
                }
            })
            .map_err(transport)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if let Some(source) = write_error {
            return Err(storage_err(source));
        }
        if overrun {
            return match easy.response_code() {
                Ok(status) if !(200..300).contains(&status) => {
                    Err(FetchError::Http { index, status })
                }
                _ => Err(FetchError::Overrun { index, expected }),
            };
        }
        if e.is_write_error() && abort.load(Ordering::Relaxed) {
            return Err(FetchError::Aborted { index });
        }
        return Err(transport(e));
    }

    let status = easy.response_code().map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Http { index, status });
    }
    if received != expected {
        return Err(FetchError::PartialTransfer {
            index,
            expected,
            received,
        });
    }

    writer.flush().map_err(storage_err)?;
    Ok(())
}
