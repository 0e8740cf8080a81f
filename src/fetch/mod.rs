//! Page fetching
//!
//! Turns a target into raw HTML. Three sources:
//! - [`ScrapeApiFetcher`]: a hosted scrape API, used when a credential is configured
//! - [`DirectFetcher`]: a plain HTTP GET
//! - [`read_html_file`]: a local file or stdin, for offline audits
//!
//! Multi-page runs go through [`crawl::crawl`], which combines pages into one
//! document before analysis.

pub mod crawl;
mod direct;
mod scrape_api;

pub use crawl::{combine_pages, crawl, same_host_links, FetchedPage};
pub use direct::DirectFetcher;
pub use scrape_api::ScrapeApiFetcher;

use crate::config::ScrapeSettings;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No HTML content found for {target}")]
    NoContent { target: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_no_content(&self) -> bool {
        matches!(self, FetchError::NoContent { .. })
    }
}

/// Something that turns a URL into HTML
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> FetchResult<String>;

    /// Short label for logs and spinners
    fn name(&self) -> &'static str;
}

/// Pick the fetcher for these settings
pub fn fetcher_for(settings: &ScrapeSettings) -> Box<dyn PageFetcher> {
    match settings.api_key.as_deref() {
        Some(key) => Box::new(ScrapeApiFetcher::new(
            &settings.base_url,
            key,
            settings.timeout,
        )),
        None => Box::new(DirectFetcher::new(settings.timeout)),
    }
}

pub(crate) fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // callers map 4xx/5xx themselves
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

/// Payload keys that conventionally hold page HTML, most specific first
pub const HTML_KEYS: &[&str] = &["rawHtml", "html", "content", "body"];

/// Find the HTML string inside a scrape payload.
///
/// Looks at the conventional keys on the top level and then under `data`.
/// A bare string payload is accepted when it looks like markup.
pub fn locate_html(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) if looks_like_html(s) => Some(s.clone()),
        Value::Object(map) => {
            let direct = HTML_KEYS.iter().find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
            });
            match direct {
                Some(html) => Some(html.to_string()),
                None => map.get("data").and_then(locate_html),
            }
        }
        _ => None,
    }
}

/// Cheap sniff for markup: the first non-space character opens a tag
pub fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('<') && trimmed.contains('>')
}

/// Read HTML from a file, or from stdin when `path` is `-`
pub fn read_html_file(path: &Path) -> FetchResult<String> {
    let label = path.display().to_string();
    let html = if label == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| FetchError::Io {
                path: "stdin".to_string(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: label.clone(),
            source,
        })?
    };

    if html.trim().is_empty() {
        return Err(FetchError::NoContent { target: label });
    }
    Ok(html)
}
