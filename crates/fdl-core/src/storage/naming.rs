//! Output-name collision handling.

use std::fs;
use std::io;
use std::path::Path;

/// Returns `desired` if no such entry exists in `dir`; otherwise a
/// numbered variant `stem (n).ext`.
///
/// `n` starts at the number of files in `dir` matching `stem*.ext` (so with
/// `report.txt` and `report (1).txt` present the result is `report (2).txt`)
/// and is bumped while the candidate is taken. Best effort: a concurrent
/// writer can still race this check.
pub fn resolve_name(dir: &Path, desired: &str) -> io::Result<String> {
    if !dir.join(desired).exists() {
        return Ok(desired.to_string());
    }

    let (stem, ext) = split_name(desired);
    let mut n = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matches_pattern(&entry.file_name().to_string_lossy(), stem, ext) {
            n += 1;
        }
    }

    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if !dir.join(&candidate).exists() {
            tracing::debug!(desired, chosen = %candidate, "output name taken, renamed");
            return Ok(candidate);
        }
        n += 1;
    }
}

/// `archive.tar.gz` → (`archive.tar`, `gz`); `README` → (`README`, None).
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Glob `stem*.ext` (or `stem*` without extension).
fn matches_pattern(name: &str, stem: &str, ext: Option<&str>) -> bool {
    let Some(rest) = name.strip_prefix(stem) else {
        return false;
    };
    match ext {
        Some(ext) => rest
            .strip_suffix(ext)
            .is_some_and(|middle| middle.ends_with('.')),
        None => true,
    }
}
