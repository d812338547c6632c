//! File-name hint from the URL path.

use percent_encoding::percent_decode_str;

/// Last non-empty path segment of `url`, query and fragment stripped and
/// percent-decoded.
///
/// Strings that do not parse as URLs are split by hand so a bare
/// `host/path/file.zip?x=1` still yields `file.zip`. Returns `None` for an
/// empty path or a `.`/`..` segment.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()?
            .rsplit('/')
            .find(|s| !s.is_empty())?
            .to_string(),
    };
    let decoded = percent_decode_str(&segment).decode_utf8_lossy().into_owned();
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}
