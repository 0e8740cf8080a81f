//! CLI definition, run entry point and exit-code mapping

mod audit;
mod output;

pub use output::{artifact_stem, host_label, sanitize_host, write_artifacts, ArtifactOutcome};

use crate::config::ConfigError;
use crate::fetch::FetchError;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes
pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_FETCH: u8 = 3;
pub const EXIT_NO_CONTENT: u8 = 4;

/// Invalid combination of options that clap cannot express
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Parse and validate the crawl page limit (1-50)
fn parse_page_limit(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("pages must be at least 1".to_string())
    } else if n > 50 {
        Err("pages cannot exceed 50".to_string())
    } else {
        Ok(n)
    }
}

/// geo-audit - SEO/GEO readiness audit for web pages
#[derive(Parser, Debug)]
#[command(name = "geo-audit")]
#[command(
    version,
    about = "Audit a web page for SEO and local/generative-engine (GEO) readiness",
    long_about = "Fetches a page (or a handful of same-site pages), scores it against a fixed \
12-check rubric, computes readability and local-relevance heuristics, optionally asks an LLM \
for a second opinion, and writes JSON and HTML reports.\n\n\
Scoring is deterministic and runs offline; only fetching and the optional AI review touch the network.",
    after_help = "\
Examples:
  geo-audit https://example.com                    Audit one page
  geo-audit https://example.com --crawl --pages 3  Audit the start page plus 2 linked pages
  geo-audit --html-file page.html --no-ai          Offline audit of a saved page
  curl -s https://example.com | geo-audit --html-file -
  geo-audit example.com --format json --no-html    JSON on stdout, JSON artifact only

Environment:
  SCRAPE_API_KEY, SCRAPE_API_URL     Scrape API credential and base URL (direct GET without a key)
  ANTHROPIC_API_KEY, OPENAI_API_KEY  AI review credentials (per --backend)
  GEO_AUDIT_AI_MAX_CHARS             HTML characters sent to the AI review

Exit codes: 0 ok, 1 failure, 2 usage error, 3 fetch error, 4 no content"
)]
pub struct Cli {
    /// URL of the page to audit (scheme optional)
    #[arg(value_name = "URL", required_unless_present = "html_file")]
    pub target: Option<String>,

    /// Audit a saved HTML file instead of fetching ('-' reads stdin)
    #[arg(long, value_name = "PATH", conflicts_with = "crawl")]
    pub html_file: Option<PathBuf>,

    /// Also audit same-site pages linked from the start page
    #[arg(long)]
    pub crawl: bool,

    /// Maximum pages to audit with --crawl, including the start page (default: 5)
    #[arg(long, value_parser = parse_page_limit, requires = "crawl")]
    pub pages: Option<usize>,

    /// Directory for report artifacts (default: reports)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Format printed to stdout
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Config file (default: ./geo-audit.toml if present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip the AI review
    #[arg(long)]
    pub no_ai: bool,

    /// AI backend
    #[arg(long, value_parser = ["anthropic", "openai", "deepinfra", "openrouter", "ollama"])]
    pub backend: Option<String>,

    /// AI model (default depends on backend)
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum HTML characters sent to the AI review
    #[arg(long, value_name = "CHARS")]
    pub max_ai_chars: Option<usize>,

    /// Don't write the JSON artifact
    #[arg(long)]
    pub no_json: bool,

    /// Don't write the HTML artifact
    #[arg(long)]
    pub no_html: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

pub fn run(cli: Cli) -> Result<()> {
    audit::run(cli)
}

/// Map an error to the process exit code
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(fetch) = cause.downcast_ref::<FetchError>() {
            return if fetch.is_no_content() {
                EXIT_NO_CONTENT
            } else {
                EXIT_FETCH
            };
        }
        if cause.is::<UsageError>() || cause.is::<ConfigError>() {
            return EXIT_USAGE;
        }
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_parse_page_limit() {
        assert_eq!(parse_page_limit("3"), Ok(3));
        assert!(parse_page_limit("0").is_err());
        assert!(parse_page_limit("51").is_err());
        assert!(parse_page_limit("many").is_err());
    }

    #[test]
    fn test_cli_parses_url_and_flags() {
        let cli = Cli::try_parse_from([
            "geo-audit",
            "https://example.com",
            "--crawl",
            "--pages",
            "3",
            "--no-ai",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.target.as_deref(), Some("https://example.com"));
        assert!(cli.crawl && cli.no_ai);
        assert_eq!(cli.pages, Some(3));
        assert_eq!(cli.format, "json");
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_cli_requires_a_source() {
        assert!(Cli::try_parse_from(["geo-audit"]).is_err());
        assert!(Cli::try_parse_from(["geo-audit", "--html-file", "page.html"]).is_ok());
    }

    #[test]
    fn test_cli_rejects_crawling_a_file() {
        assert!(Cli::try_parse_from(["geo-audit", "--html-file", "p.html", "--crawl"]).is_err());
        assert!(Cli::try_parse_from(["geo-audit", "https://example.com", "--pages", "2"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let no_content: anyhow::Error = FetchError::NoContent {
            target: "https://example.com".into(),
        }
        .into();
        assert_eq!(exit_code(&no_content), EXIT_NO_CONTENT);

        let fetch = Err::<(), _>(FetchError::Api {
            status: 503,
            message: "down".into(),
        })
        .context("Failed to fetch https://example.com")
        .unwrap_err();
        assert_eq!(exit_code(&fetch), EXIT_FETCH);

        let usage: anyhow::Error = UsageError("bad url".into()).into();
        assert_eq!(exit_code(&usage), EXIT_USAGE);

        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), EXIT_FAILURE);
    }
}
