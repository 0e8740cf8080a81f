//! Text (terminal) reporter with colors and formatting

use crate::models::{AuditMode, AuditReport, EnrichmentOutcome, Priority};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "\x1b[91m",   // Light red
        Priority::Medium => "\x1b[33m", // Yellow
        Priority::Low => "\x1b[34m",    // Blue
    }
}

fn priority_tag(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "[H]",
        Priority::Medium => "[M]",
        Priority::Low => "[L]",
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";

/// Render report as formatted terminal output
pub fn render(report: &AuditReport) -> Result<String> {
    let mut out = String::new();
    let rubric = &report.rubric;
    let metrics = &report.metrics;

    // Header
    let grade = report.grade();
    let grade_c = grade_color(grade);
    out.push_str(&format!("\n{BOLD}SEO/GEO Audit{RESET}  {}\n", report.target));
    if let AuditMode::Multi { pages } = &report.mode {
        out.push_str(&format!("{DIM}{} pages crawled{RESET}\n", pages.len()));
    }
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{:.2}%{RESET} ({}/{})  Grade: {grade_c}{BOLD}{}{RESET}  Checks: {}/{}\n\n",
        rubric.score,
        rubric.total_awarded,
        rubric.total_possible,
        grade,
        rubric.passed_count(),
        rubric.checks.len()
    ));

    // Metrics (compact)
    out.push_str(&format!("{BOLD}METRICS{RESET}\n"));
    out.push_str(&format!(
        "  Readability: {} ({})  Words: {}  Sentences: {}  Paragraphs: {}\n",
        format_score(metrics.readability.score as f64),
        metrics.readability.label,
        metrics.readability.words,
        metrics.readability.sentences,
        metrics.readability.paragraphs
    ));
    out.push_str(&format!(
        "  GEO score: {}",
        format_score(metrics.geo.total as f64)
    ));
    if !metrics.entities.is_empty() {
        out.push_str(&format!(
            "  Entities: {DIM}{}{RESET}",
            metrics.entities.join(", ")
        ));
    }
    out.push_str("\n\n");

    // Checks table
    out.push_str(&format!("{BOLD}CHECKS{RESET}\n"));
    for check in rubric.checks.values() {
        let mark = if check.passed {
            format!("{GREEN}✓{RESET}")
        } else {
            format!("{RED}✗{RESET}")
        };
        out.push_str(&format!(
            "  {}  {:<26} {DIM}{:>2}/{:<2}{RESET}\n",
            mark,
            check.key.label(),
            check.awarded,
            check.max
        ));
    }
    out.push('\n');

    // Suggestions
    if !rubric.suggestions.is_empty() {
        out.push_str(&format!(
            "{BOLD}SUGGESTIONS{RESET} ({} total)\n",
            rubric.suggestions.len()
        ));
        for (i, suggestion) in rubric.suggestions.iter().enumerate() {
            let pc = priority_color(suggestion.priority);
            out.push_str(&format!(
                "  {DIM}{:>2}{RESET}  {pc}{}{RESET}  {}\n",
                i + 1,
                priority_tag(suggestion.priority),
                suggestion.advice
            ));
        }
        out.push('\n');
    }

    // Enrichment status
    match &report.enrichment {
        EnrichmentOutcome::Completed(enrichment) => {
            out.push_str(&format!("{BOLD}AI REVIEW{RESET}\n"));
            for (name, score) in &enrichment.scores {
                out.push_str(&format!("  {}: {:.0}\n", name, score));
            }
            if !enrichment.missing_signals.is_empty() {
                out.push_str(&format!(
                    "  Missing: {}\n",
                    enrichment.missing_signals.join(", ")
                ));
            }
            for suggestion in &enrichment.suggestions {
                let pc = priority_color(suggestion.priority);
                out.push_str(&format!(
                    "  {pc}{}{RESET} {BOLD}{}{RESET}  {}\n",
                    priority_tag(suggestion.priority),
                    suggestion.key,
                    suggestion.advice
                ));
            }
            if let Some(notes) = &enrichment.notes {
                out.push_str(&format!("  {DIM}{}{RESET}\n", notes));
            }
            out.push('\n');
        }
        EnrichmentOutcome::Skipped { reason } => {
            out.push_str(&format!("{DIM}AI review skipped: {}{RESET}\n", reason));
        }
        EnrichmentOutcome::Failed { error } => {
            out.push_str(&format!("{RED}AI review failed:{RESET} {}\n", error));
        }
    }

    // Top issues
    if !report.top_issues.is_empty() {
        let top: Vec<String> = report
            .top_issues
            .iter()
            .take(5)
            .map(|i| format!("{} ×{}", i.key, i.count))
            .collect();
        out.push_str(&format!("{DIM}Top issues: {}{RESET}\n", top.join(", ")));
    }

    Ok(out)
}

/// Format score with color
fn format_score(score: f64) -> String {
    let color = if score >= 80.0 {
        "\x1b[32m"
    } else if score >= 60.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    };
    format!("{color}{:.0}{RESET}", score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{enriched_report, test_report};

    #[test]
    fn test_text_render_lists_every_check() {
        let report = test_report();
        let out = render(&report).expect("render text");
        assert!(out.contains("SEO/GEO Audit"));
        assert!(out.contains("https://example.com/"));
        for check in report.rubric.checks.values() {
            assert!(out.contains(check.key.label()), "missing {}", check.key);
        }
        assert!(out.contains("AI review skipped: disabled"));
    }

    #[test]
    fn test_text_render_enrichment() {
        let out = render(&enriched_report()).expect("render text");
        assert!(out.contains("AI REVIEW"));
        assert!(out.contains("Missing: opening hours"));
        assert!(out.contains("faq"));
    }

    #[test]
    fn test_text_render_multi_page() {
        let mut report = test_report();
        report.mode = AuditMode::Multi {
            pages: vec!["https://example.com/".into(), "https://example.com/a".into()],
        };
        assert!(render(&report).unwrap().contains("2 pages crawled"));
    }
}
