//! Shallow same-host crawl for multi-page audits
//!
//! Only links on the start page are followed. Pages are kept in the order
//! they were fetched and combined into one document with boundary markers.

use super::{FetchError, FetchResult, PageFetcher};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

/// Boundary marker placed before page `index` (1-based) in a combined document
pub fn page_marker(index: usize, url: &str) -> String {
    format!("<!-- geo-audit:page {} {} -->", index, url)
}

/// Absolute same-host links in document order.
///
/// Fragments are stripped, duplicates and the base page itself are dropped,
/// and only http(s) targets are kept.
pub fn same_host_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let mut base_key = base.clone();
    base_key.set_fragment(None);

    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(base_key.to_string());

    let mut links = Vec::new();
    for element in document.select(&ANCHOR) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let mut resolved = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if resolved.host_str() != base.host_str() {
            continue;
        }
        resolved.set_fragment(None);

        let target = resolved.to_string();
        if seen.insert(target.clone()) {
            links.push(target);
        }
    }
    links
}

/// Fetch the start page plus up to `page_limit - 1` same-host pages it links to.
///
/// A failing start page fails the crawl. Failing secondary pages are logged
/// and skipped; the next candidate link takes their slot.
pub fn crawl(
    fetcher: &dyn PageFetcher,
    start_url: &str,
    page_limit: usize,
) -> FetchResult<Vec<FetchedPage>> {
    let start_html = fetcher.fetch(start_url)?;
    let candidates = same_host_links(&start_html, start_url);
    debug!(
        "Found {} same-host links on {}",
        candidates.len(),
        start_url
    );

    let mut pages = vec![FetchedPage {
        url: start_url.to_string(),
        html: start_html,
    }];

    for url in candidates {
        if pages.len() >= page_limit {
            break;
        }
        match fetcher.fetch(&url) {
            Ok(html) => pages.push(FetchedPage { url, html }),
            Err(e) => warn!("Skipping {}: {}", url, e),
        }
    }

    if pages.iter().all(|p| p.html.trim().is_empty()) {
        return Err(FetchError::NoContent {
            target: start_url.to_string(),
        });
    }
    Ok(pages)
}

/// Concatenate pages into one document, each preceded by its marker
pub fn combine_pages(pages: &[FetchedPage]) -> String {
    let mut combined = String::new();
    for (i, page) in pages.iter().enumerate() {
        combined.push_str(&page_marker(i + 1, &page.url));
        combined.push('\n');
        combined.push_str(&page.html);
        combined.push('\n');
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> FetchResult<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or(FetchError::Api {
                status: 404,
                message: "not found".into(),
            })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    const HOME: &str = r##"<html><body>
        <a href="/about">About</a>
        <a href="/about#team">Team</a>
        <a href="https://other.example.org/x">Elsewhere</a>
        <a href="mailto:hi@example.com">Mail</a>
        <a href="#top">Top</a>
        <a href="contact">Contact</a>
        <a href="/">Home</a>
        <a href="/missing">Broken</a>
        <a href="/blog">Blog</a>
    </body></html>"##;

    #[test]
    fn test_same_host_links_order_and_dedup() {
        let links = same_host_links(HOME, "https://example.com/");
        assert_eq!(
            links,
            vec![
                "https://example.com/about",
                "https://example.com/contact",
                "https://example.com/missing",
                "https://example.com/blog",
            ]
        );
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        assert!(same_host_links(HOME, "not a url").is_empty());
    }

    #[test]
    fn test_crawl_respects_limit_and_skips_failures() {
        let fetcher = FakeFetcher::new(&[
            ("https://example.com/", HOME),
            ("https://example.com/about", "<p>About us</p>"),
            ("https://example.com/contact", "<p>Call us</p>"),
            ("https://example.com/blog", "<p>Blog</p>"),
        ]);
        let pages = crawl(&fetcher, "https://example.com/", 4).unwrap();
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/contact",
                "https://example.com/blog",
            ]
        );
        // /missing was attempted and skipped
        assert!(fetcher
            .calls
            .borrow()
            .contains(&"https://example.com/missing".to_string()));
    }

    #[test]
    fn test_crawl_limit_of_one_fetches_only_start() {
        let fetcher = FakeFetcher::new(&[("https://example.com/", HOME)]);
        let pages = crawl(&fetcher, "https://example.com/", 1).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[test]
    fn test_crawl_fails_when_start_page_fails() {
        let fetcher = FakeFetcher::new(&[]);
        assert!(matches!(
            crawl(&fetcher, "https://example.com/", 5),
            Err(FetchError::Api { status: 404, .. })
        ));
    }

    #[test]
    fn test_combine_pages_keeps_order_with_markers() {
        let pages = vec![
            FetchedPage {
                url: "https://example.com/".into(),
                html: "<p>one</p>".into(),
            },
            FetchedPage {
                url: "https://example.com/two".into(),
                html: "<p>two</p>".into(),
            },
        ];
        let combined = combine_pages(&pages);
        let first = combined
            .find("<!-- geo-audit:page 1 https://example.com/ -->")
            .unwrap();
        let second = combined
            .find("<!-- geo-audit:page 2 https://example.com/two -->")
            .unwrap();
        assert!(first < second);
        assert!(combined.find("<p>one</p>").unwrap() < second);
    }
}
