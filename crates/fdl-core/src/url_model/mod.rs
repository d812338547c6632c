//! URL modeling and file-name derivation.
//!
//! Derives a safe local file name from the Content-Disposition header or the
//! URL path, sanitized against a fixed deny-list of filesystem-unsafe characters.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::{sanitize_file_name, NAME_MAX};

pub(crate) use sanitize::truncate_utf8;

/// File name used when neither the header nor the URL yields anything usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe file name for saving a download.
///
/// Prefers the name from `content_disposition` (if present and parseable),
/// otherwise the last path segment of `url` with its query stripped.
///
/// - `derive_filename("https://example.com/archive.zip?x=1", None)` → `"archive.zip"`
/// - `derive_filename("https://example.com/", Some("attachment; filename=\"report.pdf\""))` → `"report.pdf"`
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> String {
    let candidate = content_disposition
        .and_then(parse_content_disposition_filename)
        .or_else(|| filename_from_url_path(url));

    match candidate.map(|raw| sanitize_file_name(&raw)) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_FILENAME.to_string(),
    }
}
