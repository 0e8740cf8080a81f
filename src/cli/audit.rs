//! The audit command: acquire HTML, run the pipeline, print and write reports

use super::output::{artifact_stem, host_label, write_artifacts};
use super::{Cli, UsageError};
use crate::ai::{AiClient, AiConfig, LlmBackend, LlmEnricher};
use crate::config::AuditConfig;
use crate::fetch::{self, combine_pages, read_html_file, PageFetcher};
use crate::models::AuditMode;
use crate::pipeline::Pipeline;
use crate::reporters::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Where the HTML comes from
enum Source {
    File(PathBuf),
    Page(String),
    Crawl(String),
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = AuditConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    apply_cli_overrides(&mut config, &cli)?;
    let format = OutputFormat::from_str(&cli.format)?;

    let source = match (&cli.html_file, &cli.target) {
        (Some(path), _) => Source::File(path.clone()),
        (None, Some(target)) => {
            let url = normalize_target(target)?;
            if cli.crawl {
                Source::Crawl(url)
            } else {
                Source::Page(url)
            }
        }
        (None, None) => return Err(UsageError("a URL or --html-file is required".into()).into()),
    };

    warn_missing_credentials(&config, &source);

    let spinner_style = create_spinner_style();

    // Acquire HTML
    let fetch_spinner = ProgressBar::new_spinner();
    fetch_spinner.set_style(spinner_style.clone());
    fetch_spinner.enable_steady_tick(Duration::from_millis(100));

    let (target, mode, html) = match source {
        Source::File(path) => {
            fetch_spinner.set_message(format!("Reading {}...", path.display()));
            let html = read_html_file(&path)?;
            let target = file_label(cli.target.as_deref(), &path)?;
            (target, AuditMode::Single, html)
        }
        Source::Page(url) => {
            let fetcher = fetch::fetcher_for(&config.scrape);
            fetch_spinner.set_message(format!("Fetching {} ({})...", url, fetcher.name()));
            let html = fetch_page(fetcher.as_ref(), &url)?;
            (url, AuditMode::Single, html)
        }
        Source::Crawl(url) => {
            let fetcher = fetch::fetcher_for(&config.scrape);
            fetch_spinner.set_message(format!(
                "Crawling {} (up to {} pages)...",
                url, config.page_limit
            ));
            let pages = fetch::crawl(fetcher.as_ref(), &url, config.page_limit)
                .with_context(|| format!("Failed to fetch {}", url))?;
            let urls: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
            (url, AuditMode::Multi { pages: urls }, combine_pages(&pages))
        }
    };

    let page_count = match &mode {
        AuditMode::Single => 1,
        AuditMode::Multi { pages } => pages.len(),
    };
    fetch_spinner.finish_with_message(format!(
        "{}Loaded {} page{} ({} KB)",
        style("✓ ").green(),
        style(page_count).cyan(),
        if page_count == 1 { "" } else { "s" },
        html.len() / 1024
    ));

    // Analyze (and enrich)
    let enricher = build_enricher(&config);
    let mut pipeline = Pipeline::new(&config);
    pipeline = match &enricher {
        Ok(enricher) => pipeline.with_enricher(enricher),
        Err(reason) => pipeline.without_enrichment(reason.clone()),
    };

    let analyze_spinner = ProgressBar::new_spinner();
    analyze_spinner.set_style(spinner_style);
    analyze_spinner.enable_steady_tick(Duration::from_millis(100));
    analyze_spinner.set_message(if enricher.is_ok() {
        "Scoring and requesting AI review..."
    } else {
        "Scoring..."
    });
    let report = pipeline.run(&target, mode, &html);
    analyze_spinner.finish_with_message(format!(
        "{}Score {:.2}% ({} of {} checks passed)",
        style("✓ ").green(),
        style(report.rubric.score).cyan(),
        report.rubric.passed_count(),
        report.rubric.checks.len()
    ));
    info!("Audited {} in {} mode", target, if report.mode.is_multi() { "multi-page" } else { "single-page" });

    // Print
    print!("{}", reporters::report_with_format(&report, format)?);

    // Write artifacts
    let stem = artifact_stem(&host_label(&report.target), report.generated_at);
    let outcomes = write_artifacts(&report, &config.output, &stem);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => eprintln!(
                "{}Wrote {} report: {}",
                style("✓ ").green(),
                outcome.format,
                style(outcome.path.display()).cyan()
            ),
            Err(e) => eprintln!(
                "{}Could not write {} report: {:#}",
                style("⚠ ").yellow(),
                outcome.format,
                e
            ),
        }
    }
    if !outcomes.is_empty() && outcomes.iter().all(|o| o.result.is_err()) {
        bail!(
            "No report artifacts could be written to {}",
            config.output.dir.display()
        );
    }

    Ok(())
}

fn fetch_page(fetcher: &dyn PageFetcher, url: &str) -> Result<String> {
    fetcher
        .fetch(url)
        .with_context(|| format!("Failed to fetch {}", url))
}

/// CLI flags are the highest-priority config layer
fn apply_cli_overrides(config: &mut AuditConfig, cli: &Cli) -> Result<()> {
    if let Some(pages) = cli.pages {
        config.set_page_limit(pages)?;
    }
    if let Some(dir) = &cli.out_dir {
        config.output.dir = dir.clone();
    }
    if cli.no_json {
        config.output.json = false;
    }
    if cli.no_html {
        config.output.html = false;
    }
    if cli.no_ai {
        config.ai.enabled = false;
    }
    if let Some(backend) = &cli.backend {
        let backend = LlmBackend::from_str(backend).map_err(UsageError)?;
        if backend != config.ai.backend {
            config.ai.backend = backend;
            // a key picked up for the previous backend does not carry over
            config.ai.api_key = None;
            config.apply_env(|name| std::env::var(name).ok())?;
        }
    }
    if let Some(model) = &cli.model {
        config.ai.model = Some(model.clone());
    }
    if let Some(max) = cli.max_ai_chars {
        config.ai.max_input_chars = max;
    }
    Ok(())
}

/// Accept `example.com` as `https://example.com`; reject anything else that
/// is not an http(s) URL.
fn normalize_target(target: &str) -> Result<String> {
    let trimmed = target.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", trimmed))
            .map_err(|e| UsageError(format!("invalid URL '{}': {}", target, e)))?,
        Err(e) => return Err(UsageError(format!("invalid URL '{}': {}", target, e)).into()),
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UsageError(format!("unsupported URL scheme '{}'", parsed.scheme())).into());
    }
    if parsed.host_str().is_none() {
        return Err(UsageError(format!("URL '{}' has no host", target)).into());
    }
    Ok(parsed.to_string())
}

/// Report target for a file audit: the positional URL when given, else the path
fn file_label(target: Option<&str>, path: &Path) -> Result<String> {
    match target {
        Some(url) => normalize_target(url),
        None => Ok(path.display().to_string()),
    }
}

/// Logged once, before any work starts
fn warn_missing_credentials(config: &AuditConfig, source: &Source) {
    if !matches!(source, Source::File(_)) && config.scrape.api_key.is_none() {
        warn!("SCRAPE_API_KEY not set; fetching pages directly without the scrape API");
    }
    if config.ai.enabled && !config.has_ai_credential() {
        warn!(
            "{} not set; the report will not include an AI review",
            config.ai.backend.env_key()
        );
    }
}

/// The enricher for this run, or the reason there is none
fn build_enricher(config: &AuditConfig) -> Result<LlmEnricher, String> {
    if !config.ai.enabled {
        return Err("AI review disabled".to_string());
    }
    if !config.has_ai_credential() {
        return Err(format!("{} not set", config.ai.backend.env_key()));
    }

    let ai_config = AiConfig {
        backend: config.ai.backend,
        model: config.ai.model.clone(),
        timeout: config.ai.timeout,
        ..Default::default()
    };
    let client = AiClient::from_config(ai_config, config.ai.api_key.as_deref())
        .map_err(|e| e.to_string())?;
    Ok(LlmEnricher::new(client, config.ai.max_input_chars))
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid spinner template")
}
