//! HTML parser for extracting same-site links
//!
//! This module handles parsing fetched content to extract:
//! - Links to follow (from `<a href>` tags that are in the site scope)
//! - Page title, for logging

use crate::url::SiteScope;
use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// In-scope links found on the page (absolute URLs, in document order)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and the title
///
/// # Link Extraction Rules
///
/// Only `<a href="...">` anchors are considered. An href is kept when it
/// starts with the seed URL (kept verbatim) or is root-relative (joined to
/// the seed's scheme and host). Anchors without an href, empty hrefs and
/// every other form are skipped. Content that is not HTML simply yields no
/// links.
///
/// # Example
///
/// ```
/// use sitegrab::crawler::parse_html;
/// use sitegrab::url::SiteScope;
///
/// let scope = SiteScope::new("https://example.com/").unwrap();
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html, &scope);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, scope: &SiteScope) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, scope),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all in-scope anchor links from the HTML document
fn extract_links(document: &Html, scope: &SiteScope) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| scope.resolve(href))
        .collect()
}
