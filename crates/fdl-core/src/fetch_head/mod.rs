//! Resource metadata resolution.
//!
//! Uses the curl crate (libcurl) to send a HEAD request, then derives the
//! total size and a suggested file name. Any failure here is fatal for the
//! job; nothing is retried.

mod parse;

use std::str;
use thiserror::Error;

use crate::url_model;

/// Why a resource could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("HEAD {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("HEAD {url} returned HTTP {status}")]
    Status { url: String, status: u32 },
    #[error("HEAD {url} did not report a Content-Length")]
    MissingSize { url: String },
    #[error("could not resolve page {url}: {reason}")]
    Collaborator { url: String, reason: String },
}

/// Headers of a HEAD response that matter for a chunked download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// Raw `Content-Disposition` value (file-name hint).
    pub content_disposition: Option<String>,
}

/// Size and name of a remote resource, known before any byte is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub total_size: u64,
    pub suggested_name: String,
}

fn transport(url: &str) -> impl Fn(curl::Error) -> ResolveError + '_ {
    move |source| ResolveError::Transport {
        url: url.to_string(),
        source,
    }
}

/// Performs a HEAD request and returns the parsed headers of the final response.
///
/// Follows redirects. No timeouts are set; libcurl defaults apply.
/// Blocks the current thread; call from `spawn_blocking` in async code.
pub fn probe(url: &str) -> Result<HeadResult, ResolveError> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport(url))?;
    easy.nobody(true).map_err(transport(url))?;
    easy.follow_location(true).map_err(transport(url))?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(transport(url))?;
        transfer.perform().map_err(transport(url))?;
    }

    let status = easy.response_code().map_err(transport(url))?;
    if !(200..300).contains(&status) {
        return Err(ResolveError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(parse::parse_headers(&lines))
}

/// Resolves the total size and suggested file name of `url`.
///
/// The name comes from Content-Disposition when present, else from the last
/// URL path segment; see [`url_model::derive_filename`].
pub fn resolve_resource(url: &str) -> Result<ResourceInfo, ResolveError> {
    let head = probe(url)?;
    resource_from_head(url, &head)
}

fn resource_from_head(url: &str, head: &HeadResult) -> Result<ResourceInfo, ResolveError> {
    let total_size = head.content_length.ok_or_else(|| ResolveError::MissingSize {
        url: url.to_string(),
    })?;
    if !head.accept_ranges {
        tracing::debug!(url, "server did not advertise Accept-Ranges: bytes");
    }
    Ok(ResourceInfo {
        total_size,
        suggested_name: url_model::derive_filename(url, head.content_disposition.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_requires_content_length() {
        let head = HeadResult::default();
        let err = resource_from_head("https://example.com/a.zip", &head).unwrap_err();
        assert!(matches!(err, ResolveError::MissingSize { .. }));
    }

    #[test]
    fn resource_name_prefers_content_disposition() {
        let head = HeadResult {
            content_length: Some(10),
            accept_ranges: true,
            content_disposition: Some("attachment; filename=\"real.iso\"".to_string()),
        };
        let info = resource_from_head("https://example.com/get?id=7", &head).unwrap();
        assert_eq!(info.total_size, 10);
        assert_eq!(info.suggested_name, "real.iso");
    }

    #[test]
    fn resource_name_from_url_without_query() {
        let head = HeadResult {
            content_length: Some(0),
            ..HeadResult::default()
        };
        let info = resource_from_head("https://example.com/files/pack.zip?sig=abc", &head).unwrap();
        assert_eq!(info.total_size, 0);
        assert_eq!(info.suggested_name, "pack.zip");
    }
}
