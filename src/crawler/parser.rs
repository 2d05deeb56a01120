//! HTML link extraction
//!
//! This module turns a rendered page into the links the harvest follows:
//! - cohort links and download links, matched on their `href`
//! - dataset links, matched on their visible text

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// A page as the renderer delivered it
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL the page was loaded from (after redirects)
    pub url: Url,

    /// The rendered HTML
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }
}

/// A followable `<a>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL the link points to
    pub href: String,

    /// Visible text of the element, whitespace-trimmed
    pub text: String,
}

/// Which `<a>` elements a search selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPredicate {
    /// The raw `href` attribute contains the substring
    HrefContains(String),

    /// The element's visible text contains the substring
    TextContains(String),
}

impl LinkPredicate {
    pub fn href_contains(s: impl Into<String>) -> Self {
        Self::HrefContains(s.into())
    }

    pub fn text_contains(s: impl Into<String>) -> Self {
        Self::TextContains(s.into())
    }

    fn matches(&self, raw_href: &str, text: &str) -> bool {
        match self {
            Self::HrefContains(needle) => raw_href.contains(needle.as_str()),
            Self::TextContains(needle) => text.contains(needle.as_str()),
        }
    }
}

/// Finds every link on the page that satisfies the predicate
///
/// The result preserves document order and keeps duplicates. A page with no
/// matching link yields an empty vector; that is the normal "nothing here"
/// case, not an error.
///
/// `href` predicates test the attribute as written in the markup; the
/// returned `href` is the absolute URL it resolves to. Anchors that cannot
/// resolve to an http(s) URL are never returned.
///
/// # Example
///
/// ```
/// use url::Url;
/// use xena_harvest::crawler::{find_links, LinkPredicate, RenderedPage};
///
/// let page = RenderedPage::new(
///     Url::parse("https://hub.example.org/datapages/").unwrap(),
///     r#"<a href="?cohort=TCGA%20Breast">TCGA Breast</a><a href="/about">About</a>"#,
/// );
/// let links = find_links(&page, &LinkPredicate::href_contains("cohort=TCGA"));
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].href, "https://hub.example.org/datapages/?cohort=TCGA%20Breast");
/// ```
pub fn find_links(page: &RenderedPage, predicate: &LinkPredicate) -> Vec<Link> {
    let document = Html::parse_document(&page.html);
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(raw_href) = element.value().attr("href") else {
            continue;
        };

        let text = element.text().collect::<String>();
        let text = text.trim();

        if !predicate.matches(raw_href, text) {
            continue;
        }

        if let Some(absolute_url) = resolve_link(raw_href, &page.url) {
            links.push(Link {
                href: absolute_url.to_string(),
                text: text.to_string(),
            });
        }
    }

    links
}

/// Returns only the first matching link, if any
pub fn first_link(page: &RenderedPage, predicate: &LinkPredicate) -> Option<Link> {
    find_links(page, predicate).into_iter().next()
}
