//! End-to-end tests for the geo-audit binary
//!
//! Every run is offline: input comes from `--html-file` (or stdin) and the
//! AI review is disabled. Each test gets its own temp directory as working
//! directory, artifact directory and config home.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn geo_audit(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_geo-audit"));
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir.join("config-home"))
        .env("HOME", workdir)
        .env_remove("RUST_LOG")
        .env_remove("SCRAPE_API_KEY")
        .env_remove("GEO_AUDIT_AI_MAX_CHARS");
    cmd
}

fn audit_file(workdir: &Path, file: &Path, extra: &[&str]) -> Output {
    geo_audit(workdir)
        .arg("--html-file")
        .arg(file)
        .args(["--no-ai", "-o", "out"])
        .args(extra)
        .output()
        .expect("run geo-audit")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}):\n{}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn artifacts(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_text_report_on_stdout() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(dir.path(), &fixture("local_business.html"), &[]);

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SEO/GEO Audit"));
    assert!(stdout.contains("Local business schema"));
    assert!(stdout.contains("AI review skipped"));
}

#[test]
fn test_json_report_shape() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(
        dir.path(),
        &fixture("local_business.html"),
        &["--format", "json"],
    );
    assert!(output.status.success(), "{:?}", output);

    let report = json_stdout(&output);
    assert_eq!(report["mode"]["kind"], "single");
    assert_eq!(report["rubric"]["checks"].as_object().unwrap().len(), 12);
    assert_eq!(report["rubric"]["total_possible"], 87);
    assert_eq!(report["enrichment"]["status"], "skipped");
    for key in ["lang", "charset", "viewport", "canonical", "json_ld", "local_schema"] {
        assert_eq!(report["rubric"]["checks"][key]["passed"], true, "{}", key);
    }
    let geo = report["metrics"]["geo"]["total"].as_u64().unwrap();
    assert!(geo > 0 && geo <= 100);
}

#[test]
fn test_sparse_page_scores_lower() {
    let dir = TempDir::new().unwrap();
    let rich = json_stdout(&audit_file(
        dir.path(),
        &fixture("local_business.html"),
        &["--format", "json", "--no-json", "--no-html"],
    ));
    let sparse = json_stdout(&audit_file(
        dir.path(),
        &fixture("sparse.html"),
        &["--format", "json", "--no-json", "--no-html"],
    ));

    let rich_score = rich["rubric"]["score"].as_f64().unwrap();
    let sparse_score = sparse["rubric"]["score"].as_f64().unwrap();
    assert!(rich_score > sparse_score, "{} vs {}", rich_score, sparse_score);
    assert_eq!(sparse["rubric"]["checks"]["h1"]["passed"], false);
    assert!(!sparse["rubric"]["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_writes_json_and_html_artifacts() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(dir.path(), &fixture("local_business.html"), &[]);
    assert!(output.status.success(), "{:?}", output);

    let names = artifacts(&dir.path().join("out"));
    assert_eq!(names.len(), 2, "{:?}", names);
    assert!(names[0].starts_with("local_") && names[0].ends_with(".html"));
    assert!(names[1].starts_with("local_") && names[1].ends_with(".json"));

    let json = std::fs::read_to_string(dir.path().join("out").join(&names[1])).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["rubric"]["checks"].as_object().unwrap().len(), 12);
}

#[test]
fn test_artifact_name_uses_target_host() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(
        dir.path(),
        &fixture("local_business.html"),
        &["https://rosasbakery.example/", "--no-html"],
    );
    assert!(output.status.success(), "{:?}", output);

    let names = artifacts(&dir.path().join("out"));
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(names[0].starts_with("rosasbakery.example_"));
    assert!(names[0].ends_with(".json"));
}

#[test]
fn test_bare_host_label_names_artifacts() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(
        dir.path(),
        &fixture("local_business.html"),
        &["rosasbakery.example", "--no-html", "-f", "json"],
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(json_stdout(&output)["target"], "https://rosasbakery.example/");

    let names = artifacts(&dir.path().join("out"));
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(names[0].starts_with("rosasbakery.example_"), "{:?}", names);
}

#[test]
fn test_disabled_artifacts_write_nothing() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(
        dir.path(),
        &fixture("sparse.html"),
        &["--no-json", "--no-html"],
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_reads_html_from_stdin() {
    let dir = TempDir::new().unwrap();
    let mut child = geo_audit(dir.path())
        .args(["--html-file", "-", "--no-ai", "--no-json", "--no-html", "-f", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn geo-audit");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(std::fs::read(fixture("local_business.html")).unwrap().as_slice())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(json_stdout(&output)["target"], "-");
}

#[test]
fn test_missing_file_is_a_fetch_error() {
    let dir = TempDir::new().unwrap();
    let output = audit_file(dir.path(), &dir.path().join("nope.html"), &[]);
    assert_eq!(output.status.code(), Some(3), "{:?}", output);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_blank_file_is_no_content() {
    let dir = TempDir::new().unwrap();
    let blank = dir.path().join("blank.html");
    std::fs::write(&blank, "  \n\t\n").unwrap();

    let output = audit_file(dir.path(), &blank, &[]);
    assert_eq!(output.status.code(), Some(4), "{:?}", output);
}

#[test]
fn test_usage_errors() {
    let dir = TempDir::new().unwrap();

    let no_source = geo_audit(dir.path()).output().unwrap();
    assert_eq!(no_source.status.code(), Some(2));

    let bad_scheme = geo_audit(dir.path())
        .args(["ftp://example.com", "--no-ai"])
        .output()
        .unwrap();
    assert_eq!(bad_scheme.status.code(), Some(2), "{:?}", bad_scheme);

    let crawl_file = geo_audit(dir.path())
        .args(["--html-file", "page.html", "--crawl"])
        .output()
        .unwrap();
    assert_eq!(crawl_file.status.code(), Some(2));
}

#[test]
fn test_project_config_weights_apply() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("geo-audit.toml"),
        "[rubric.weights]\nlang = 20\n",
    )
    .unwrap();

    let report = json_stdout(&audit_file(
        dir.path(),
        &fixture("sparse.html"),
        &["--format", "json", "--no-json", "--no-html"],
    ));
    assert_eq!(report["rubric"]["checks"]["lang"]["max"], 20);
    assert_eq!(report["rubric"]["total_possible"], 87 - 5 + 20);
}

#[test]
fn test_invalid_explicit_config_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[rubric.weights]\nnot_a_check = 3\n").unwrap();

    let output = geo_audit(dir.path())
        .arg("--html-file")
        .arg(fixture("sparse.html"))
        .arg("--config")
        .arg(&config)
        .arg("--no-ai")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{:?}", output);
}
