use super::{locate_html, looks_like_html, make_agent, FetchError, FetchResult, PageFetcher};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Client for a hosted scrape API exposing `POST {base}/scrape`
pub struct ScrapeApiFetcher {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl ScrapeApiFetcher {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/scrape", self.base_url)
    }
}

impl PageFetcher for ScrapeApiFetcher {
    fn fetch(&self, url: &str) -> FetchResult<String> {
        let endpoint = self.endpoint();
        debug!("POST {} for {}", endpoint, url);

        let response = self
            .agent
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(json!({
                "url": url,
                "formats": ["rawHtml", "html"],
            }))
            .map_err(|e| FetchError::Request {
                url: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(FetchError::Api { status, message });
        }

        let text = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Request {
                url: endpoint,
                message: e.to_string(),
            })?;

        let html = match serde_json::from_str::<Value>(&text) {
            Ok(payload) => locate_html(&payload),
            Err(_) if looks_like_html(&text) => Some(text),
            Err(_) => None,
        };

        html.ok_or_else(|| FetchError::NoContent {
            target: url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "scrape-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let fetcher = ScrapeApiFetcher::new(
            "https://api.firecrawl.dev/v1/",
            "fc-key",
            Duration::from_secs(5),
        );
        assert_eq!(fetcher.endpoint(), "https://api.firecrawl.dev/v1/scrape");
    }
}
