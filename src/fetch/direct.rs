use super::{make_agent, FetchError, FetchResult, PageFetcher};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("geo-audit/", env!("CARGO_PKG_VERSION"));

/// Plain GET, used when no scrape API credential is configured
pub struct DirectFetcher {
    agent: ureq::Agent,
}

impl DirectFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
        }
    }
}

impl PageFetcher for DirectFetcher {
    fn fetch(&self, url: &str) -> FetchResult<String> {
        debug!("GET {}", url);

        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml")
            .call()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(FetchError::Api { status, message });
        }

        let html = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if html.trim().is_empty() {
            return Err(FetchError::NoContent {
                target: url.to_string(),
            });
        }
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
