//! Resolver interface for turning page URLs (e.g. video hosting pages) into
//! direct, range-fetchable URLs.
//!
//! The core downloader only depends on this trait; it ships no site-specific
//! implementation.

use std::sync::Arc;

/// A plugin that recognizes a family of page URLs and resolves them.
///
/// Both resolve calls may block (network); the driver runs them on a blocking thread.
pub trait UrlResolver: Send + Sync {
    /// True if this resolver handles `url` (typically a host/domain pattern match).
    fn matches(&self, url: &str) -> bool;

    /// Direct URL of the media behind `page_url`.
    fn resolve_direct_url(&self, page_url: &str) -> anyhow::Result<String>;

    /// Human title of the resource behind `page_url`, used as the file stem.
    fn resolve_title(&self, page_url: &str) -> anyhow::Result<String>;

    /// Extension appended to the title to form the file name.
    fn extension(&self) -> &str {
        "mp4"
    }
}

/// First resolver in `resolvers` that claims `url`.
pub fn find_resolver(resolvers: &[Arc<dyn UrlResolver>], url: &str) -> Option<Arc<dyn UrlResolver>> {
    resolvers.iter().find(|r| r.matches(url)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HostResolver {
        host: &'static str,
    }

    impl UrlResolver for HostResolver {
        fn matches(&self, url: &str) -> bool {
            url.contains(self.host)
        }

        fn resolve_direct_url(&self, page_url: &str) -> anyhow::Result<String> {
            Ok(format!("https://cdn.example.net/media?src={}", page_url.len()))
        }

        fn resolve_title(&self, _page_url: &str) -> anyhow::Result<String> {
            Ok(format!("Title from {}", self.host))
        }
    }

    #[test]
    fn picks_first_matching_resolver() {
        let resolvers: Vec<Arc<dyn UrlResolver>> = vec![
            Arc::new(HostResolver { host: "video.example" }),
            Arc::new(HostResolver { host: "example" }),
        ];
        let found = find_resolver(&resolvers, "https://video.example/watch?v=1").unwrap();
        assert_eq!(
            found.resolve_title("https://video.example/watch?v=1").unwrap(),
            "Title from video.example"
        );
        assert_eq!(found.extension(), "mp4");
    }

    #[test]
    fn no_resolver_for_plain_urls() {
        let resolvers: Vec<Arc<dyn UrlResolver>> =
            vec![Arc::new(HostResolver { host: "video.example" })];
        assert!(find_resolver(&resolvers, "https://mirror.org/file.iso").is_none());
        assert!(find_resolver(&[], "https://mirror.org/file.iso").is_none());
    }
}
