//! Report artifacts on disk

use crate::config::OutputSettings;
use crate::models::AuditReport;
use crate::reporters::{self, file_extension, OutputFormat};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use url::Url;

/// Result of writing one artifact
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub format: OutputFormat,
    pub path: PathBuf,
    pub result: Result<()>,
}

/// Replace anything outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_host(host: &str) -> String {
    let cleaned: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "local".to_string()
    } else {
        cleaned
    }
}

/// Host part of a URL target; `local` for anything that is not a URL
pub fn host_label(target: &str) -> String {
    Url::parse(target)
        .ok()
        .and_then(|u| u.host_str().map(sanitize_host))
        .unwrap_or_else(|| "local".to_string())
}

/// `{host}_{YYYYmmdd-HHMMSS}`
pub fn artifact_stem(host: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}", host, at.format("%Y%m%d-%H%M%S"))
}

/// Write every enabled artifact. Each one is attempted on its own: a failed
/// JSON write does not stop the HTML write, and the other way round.
pub fn write_artifacts(
    report: &AuditReport,
    settings: &OutputSettings,
    stem: &str,
) -> Vec<ArtifactOutcome> {
    let mut formats = Vec::new();
    if settings.json {
        formats.push(OutputFormat::Json);
    }
    if settings.html {
        formats.push(OutputFormat::Html);
    }

    formats
        .into_iter()
        .map(|format| {
            let path = settings
                .dir
                .join(format!("{}.{}", stem, file_extension(format)));
            let result = write_one(report, format, &path);
            match &result {
                Ok(()) => debug!("Wrote {}", path.display()),
                Err(e) => error!("Failed to write {}: {:#}", path.display(), e),
            }
            ArtifactOutcome {
                format,
                path,
                result,
            }
        })
        .collect()
}

fn write_one(report: &AuditReport, format: OutputFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = reporters::report_with_format(report, format)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::models::AuditMode;
    use crate::pipeline::Pipeline;

    fn report() -> AuditReport {
        Pipeline::new(&AuditConfig::default())
            .without_enrichment("disabled")
            .run("https://example.com/", AuditMode::Single, "<title>Example page</title>")
    }

    fn settings(dir: &Path) -> OutputSettings {
        OutputSettings {
            dir: dir.to_path_buf(),
            json: true,
            html: true,
        }
    }

    #[test]
    fn test_sanitize_host() {
        assert_eq!(sanitize_host("www.example.com"), "www.example.com");
        assert_eq!(sanitize_host("[::1]"), "__1_");
        assert_eq!(sanitize_host("xn--bcher-kva.example"), "xn--bcher-kva.example");
        assert_eq!(sanitize_host(""), "local");
    }

    #[test]
    fn test_host_label() {
        assert_eq!(host_label("https://shop.example.com/a?b=c"), "shop.example.com");
        assert_eq!(host_label("page.html"), "local");
        assert_eq!(host_label("-"), "local");
    }

    #[test]
    fn test_artifact_stem_is_sortable() {
        let at = DateTime::parse_from_rfc3339("2026-03-04T05:06:07Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(artifact_stem("example.com", at), "example.com_20260304-050607");
    }

    #[test]
    fn test_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("reports");
        let outcomes = write_artifacts(&report(), &settings(&out), "example.com_1");

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        let json = std::fs::read_to_string(out.join("example.com_1.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["target"], "https://example.com/");
        assert!(std::fs::read_to_string(out.join("example.com_1.html"))
            .unwrap()
            .contains("application/json"));
    }

    #[test]
    fn test_failed_json_does_not_block_html() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the JSON file should go makes that write fail
        std::fs::create_dir_all(dir.path().join("stem.json")).unwrap();

        let outcomes = write_artifacts(&report(), &settings(dir.path()), "stem");
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[0].format, OutputFormat::Json);
        assert!(outcomes[1].result.is_ok());
        assert!(dir.path().join("stem.html").is_file());
    }

    #[test]
    fn test_disabled_artifacts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = settings(dir.path());
        s.html = false;
        let outcomes = write_artifacts(&report(), &s, "only-json");
        assert_eq!(outcomes.len(), 1);
        assert!(!dir.path().join("only-json.html").exists());
    }
}
