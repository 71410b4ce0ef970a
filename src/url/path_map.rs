//! URL to on-disk page path mapping
//!
//! Every URL maps to exactly one relative path built only from its path and
//! query components, so a page written by an earlier crawl can be found again
//! without consulting the frontier snapshot.

use crate::url::slugify;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use url::Url;

/// Filename used when a URL has no usable last segment
pub const INDEX_FILENAME: &str = "index.html";

/// Relative location of a page under the output directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PagePath {
    /// Slugified directory segments, outermost first
    pub directories: Vec<String>,

    /// File name, always ending in `.html`
    pub filename: String,
}

impl PagePath {
    /// Directory portion relative to the output root
    pub fn directory(&self) -> PathBuf {
        self.directories.iter().collect()
    }

    /// Full path relative to the output root
    pub fn relative(&self) -> PathBuf {
        self.directory().join(&self.filename)
    }

    /// Full path under `root`
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.relative())
    }
}

/// Maps a URL to its page path
///
/// The path is split on `/` with leading and trailing slashes ignored, and
/// each segment is percent-decoded and slugified. A non-empty query string becomes one more
/// trailing segment. The last segment names the file (`<slug>.html`), or
/// `index.html` when there is none or it slugifies to nothing; the rest
/// become nested directories. Segments that slugify to nothing never become
/// directories.
///
/// # Examples
///
/// ```
/// use sitegrab::url::map_url;
/// use url::Url;
///
/// let page = map_url(&Url::parse("https://example.com/docs/Intro?lang=en").unwrap());
/// assert_eq!(page.directories, vec!["docs", "intro"]);
/// assert_eq!(page.filename, "lang-en.html");
/// ```
pub fn map_url(url: &Url) -> PagePath {
    let mut segments: Vec<String> = url
        .path()
        .trim_matches('/')
        .split('/')
        .map(|segment| slugify(&decode(segment)))
        .collect();

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        segments.push(slugify(&decode(query)));
    }

    let last = segments.pop().unwrap_or_default();
    let filename = if last.is_empty() {
        INDEX_FILENAME.to_string()
    } else {
        format!("{}.html", last)
    };

    let directories = segments.into_iter().filter(|s| !s.is_empty()).collect();

    PagePath {
        directories,
        filename,
    }
}

/// Undoes the percent-encoding `Url` applies to spaces and non-ASCII text
fn decode(component: &str) -> Cow<'_, str> {
    percent_decode_str(component).decode_utf8_lossy()
}
