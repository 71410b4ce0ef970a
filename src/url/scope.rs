//! Same-site scope derived from the seed URL

use crate::{UrlError, UrlResult};
use url::Url;

/// Decides which discovered hrefs belong to the crawl
///
/// An href is in scope when it starts with the seed URL string, or when it
/// is root-relative (`/...`) and resolves against the seed's scheme and host
/// to a URL on that same origin. The prefix test is textual, so a seed
/// without a trailing slash also admits hosts that merely extend its name.
#[derive(Debug, Clone)]
pub struct SiteScope {
    seed: String,
    base: Url,
}

impl SiteScope {
    /// Builds the scope for a seed URL
    ///
    /// # Errors
    ///
    /// Returns an error if the seed does not parse, is not http(s), or has no host.
    pub fn new(seed: &str) -> UrlResult<Self> {
        let parsed = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
        }
        if parsed.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }

        let origin = parsed.origin().ascii_serialization();
        let base = Url::parse(&origin).map_err(|e| UrlError::Parse(format!("{}: {}", origin, e)))?;

        Ok(Self {
            seed: seed.to_string(),
            base,
        })
    }

    /// The seed URL exactly as given
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Scheme, host and port of the seed
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns the absolute URL for an in-scope href, or `None`
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        if href.starts_with(&self.seed) {
            return Some(href.to_string());
        }

        if href.starts_with('/') {
            let joined = self.base.join(href).ok()?;
            // protocol-relative hrefs ("//host/...") leave the site
            if joined.origin() != self.base.origin() {
                return None;
            }
            return Some(joined.to_string());
        }

        None
    }
}
