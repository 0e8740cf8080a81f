//! HTML reporter with embedded styles
//!
//! Generates a standalone HTML report that can be viewed in any browser.
//! Includes:
//! - Rubric score and grade
//! - Readability and GEO score cards with progress bars
//! - The per-check table and prioritized suggestions
//! - Enrichment results, when the pass completed
//! - The full JSON report in a `<script type="application/json">` block

use crate::models::{
    AuditMode, AuditReport, CheckResult, EnrichmentOutcome, GeoScoreBreakdown, Priority,
    Suggestion,
};
use anyhow::Result;
use chrono::Local;

/// Element id of the embedded JSON block
pub const REPORT_DATA_ID: &str = "audit-data";

/// Render report as standalone HTML
pub fn render(report: &AuditReport) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head(report));
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(report));

    html.push_str("<div class=\"content\">\n");
    html.push_str(&render_grade_section(report));
    html.push_str(&render_score_cards(report));
    html.push_str(&render_checks(report));
    html.push_str(&render_suggestions(
        "Suggestions",
        &report.rubric.suggestions,
    ));
    html.push_str(&render_top_issues(report));
    html.push_str(&render_enrichment(&report.enrichment));
    html.push_str("</div>\n"); // content

    html.push_str(&render_footer());
    html.push_str("</div>\n");
    html.push_str(&render_embedded_json(report)?);
    html.push_str("</body>\n</html>");

    Ok(html)
}

fn render_head(report: &AuditReport) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SEO/GEO Audit - {}</title>
    <style>
{CSS}
    </style>
</head>
"#,
        html_escape(&report.target)
    )
}

fn render_header(report: &AuditReport) -> String {
    let timestamp = report
        .generated_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let scope = match &report.mode {
        AuditMode::Single => "Single page".to_string(),
        AuditMode::Multi { pages } => format!("{} pages", pages.len()),
    };
    format!(
        r#"<div class="header">
    <h1>SEO/GEO Audit</h1>
    <p class="target">{}</p>
    <p class="timestamp">{} &middot; Generated {}</p>
</div>
"#,
        html_escape(&report.target),
        scope,
        timestamp
    )
}

fn render_grade_section(report: &AuditReport) -> String {
    let rubric = &report.rubric;
    format!(
        r#"<div class="grade-section">
    <div class="grade-badge grade-{grade}">{grade}</div>
    <div class="score">Rubric Score: {score:.2}%</div>
    <p class="grade-description">{awarded} of {possible} points &middot; {passed} of {total} checks passed</p>
</div>
"#,
        grade = report.grade(),
        score = rubric.score,
        awarded = rubric.total_awarded,
        possible = rubric.total_possible,
        passed = rubric.passed_count(),
        total = rubric.checks.len(),
    )
}

fn render_score_cards(report: &AuditReport) -> String {
    let readability = &report.metrics.readability;
    let geo = &report.metrics.geo;
    let readability_pct = readability.score.clamp(0, 100) as f64;

    format!(
        r#"<div class="section">
    <h2 class="section-title">Scores</h2>
    <div class="metrics-grid">
        <div class="metric-card">
            <h3>Rubric</h3>
            <div class="metric-value">{rubric:.2}</div>
            <div class="metric-bar"><div class="metric-bar-fill {rubric_bar}" style="width: {rubric}%"></div></div>
        </div>
        <div class="metric-card">
            <h3>Readability ({label})</h3>
            <div class="metric-value">{readability}</div>
            <div class="metric-bar"><div class="metric-bar-fill {readability_bar}" style="width: {readability_pct}%"></div></div>
            <p class="metric-note">{words} words &middot; {sentences} sentences &middot; {paragraphs} paragraphs</p>
        </div>
        <div class="metric-card">
            <h3>GEO Score</h3>
            <div class="metric-value">{geo_total}</div>
            <div class="metric-bar"><div class="metric-bar-fill {geo_bar}" style="width: {geo_total}%"></div></div>
            {geo_breakdown}
        </div>
    </div>
    {entities}
</div>
"#,
        rubric = report.rubric.score,
        rubric_bar = bar_class(report.rubric.score),
        label = readability.label,
        readability = readability.score,
        readability_bar = bar_class(readability_pct),
        readability_pct = readability_pct,
        words = readability.words,
        sentences = readability.sentences,
        paragraphs = readability.paragraphs,
        geo_total = geo.total,
        geo_bar = bar_class(geo.total as f64),
        geo_breakdown = render_geo_breakdown(geo),
        entities = render_entities(&report.metrics.entities),
    )
}

fn render_geo_breakdown(geo: &GeoScoreBreakdown) -> String {
    let parts = [
        ("Schema", geo.schema),
        ("Address", geo.address),
        ("Phone", geo.phone),
        ("Coordinates", geo.coordinates),
        ("Geo meta", geo.geo_meta),
        ("hreflang", geo.hreflang),
        ("Entities", geo.entity_density),
        ("Combined", geo.combined_signals),
    ];
    let items: Vec<String> = parts
        .iter()
        .filter(|(_, points)| *points > 0)
        .map(|(name, points)| format!("<li>{} +{}</li>", name, points))
        .collect();
    if items.is_empty() {
        return "<p class=\"metric-note\">No local signals found</p>".to_string();
    }
    format!("<ul class=\"breakdown\">{}</ul>", items.join(""))
}

fn render_entities(entities: &[String]) -> String {
    if entities.is_empty() {
        return String::new();
    }
    let tags: Vec<String> = entities
        .iter()
        .map(|e| format!("<span class=\"tag\">{}</span>", html_escape(e)))
        .collect();
    format!(
        "<div class=\"entities\"><h3>Entity candidates</h3>{}</div>",
        tags.join(" ")
    )
}

fn render_checks(report: &AuditReport) -> String {
    let mut html = String::from(
        r#"<div class="section">
    <h2 class="section-title">Checks</h2>
    <table class="checks">
        <thead><tr><th>Check</th><th>Status</th><th>Points</th><th>Priority</th><th>Advice</th></tr></thead>
        <tbody>
"#,
    );
    for check in report.rubric.checks.values() {
        html.push_str(&render_check_row(check));
    }
    html.push_str("        </tbody>\n    </table>\n</div>\n");
    html
}

fn render_check_row(check: &CheckResult) -> String {
    let (status_class, status) = if check.passed {
        ("status-pass", "Pass")
    } else {
        ("status-fail", "Fail")
    };
    format!(
        "        <tr><td>{}</td><td class=\"{}\">{}</td><td>{}/{}</td><td>{}</td><td>{}</td></tr>\n",
        check.key.label(),
        status_class,
        status,
        check.awarded,
        check.max,
        priority_badge(check.priority),
        check.advice.as_deref().map(html_escape).unwrap_or_default()
    )
}

fn render_suggestions(title: &str, suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return format!(
            r#"<div class="section">
    <h2 class="section-title">{}</h2>
    <p>Nothing to fix. Every check passed.</p>
</div>
"#,
            title
        );
    }

    let mut html = format!(
        r#"<div class="section">
    <h2 class="section-title">{} ({})</h2>
    <div class="suggestion-list">
"#,
        title,
        suggestions.len()
    );
    for suggestion in suggestions {
        let fix = suggestion
            .example_fix
            .as_deref()
            .map(|fix| format!("<pre class=\"example-fix\">{}</pre>", html_escape(fix)))
            .unwrap_or_default();
        html.push_str(&format!(
            r#"        <div class="suggestion-card">
            {} <span class="suggestion-key">{}</span>
            <p>{}</p>
            {}
        </div>
"#,
            priority_badge(suggestion.priority),
            html_escape(&suggestion.key),
            html_escape(&suggestion.advice),
            fix
        ));
    }
    html.push_str("    </div>\n</div>\n");
    html
}

fn render_top_issues(report: &AuditReport) -> String {
    if report.top_issues.is_empty() {
        return String::new();
    }
    let rows: Vec<String> = report
        .top_issues
        .iter()
        .map(|issue| {
            format!(
                "<li><span class=\"suggestion-key\">{}</span> &times;{}</li>",
                html_escape(&issue.key),
                issue.count
            )
        })
        .collect();
    format!(
        r#"<div class="section">
    <h2 class="section-title">Top Issues</h2>
    <ol class="top-issues">{}</ol>
</div>
"#,
        rows.join("")
    )
}

fn render_enrichment(outcome: &EnrichmentOutcome) -> String {
    let enrichment = match outcome {
        EnrichmentOutcome::Skipped { reason } => {
            return format!(
                "<div class=\"section\">\n    <h2 class=\"section-title\">AI Review</h2>\n    <p class=\"muted\">Skipped: {}</p>\n</div>\n",
                html_escape(reason)
            );
        }
        EnrichmentOutcome::Failed { error } => {
            return format!(
                "<div class=\"section\">\n    <h2 class=\"section-title\">AI Review</h2>\n    <p class=\"status-fail\">Failed: {}</p>\n</div>\n",
                html_escape(error)
            );
        }
        EnrichmentOutcome::Completed(enrichment) => enrichment,
    };

    let mut html = String::from("<div class=\"section\">\n    <h2 class=\"section-title\">AI Review</h2>\n");
    if !enrichment.scores.is_empty() {
        let cards: Vec<String> = enrichment
            .scores
            .iter()
            .map(|(name, score)| {
                format!(
                    "<div class=\"stat-item\"><div class=\"stat-value\">{:.0}</div><div class=\"stat-label\">{}</div></div>",
                    score,
                    html_escape(name)
                )
            })
            .collect();
        html.push_str(&format!(
            "    <div class=\"stats-grid\">{}</div>\n",
            cards.join("")
        ));
    }
    if !enrichment.missing_signals.is_empty() {
        let items: Vec<String> = enrichment
            .missing_signals
            .iter()
            .map(|s| format!("<li>{}</li>", html_escape(s)))
            .collect();
        html.push_str(&format!(
            "    <h3>Missing signals</h3>\n    <ul>{}</ul>\n",
            items.join("")
        ));
    }
    if let Some(notes) = &enrichment.notes {
        html.push_str(&format!("    <p class=\"notes\">{}</p>\n", html_escape(notes)));
    }
    html.push_str("</div>\n");
    if !enrichment.suggestions.is_empty() {
        html.push_str(&render_suggestions("AI Suggestions", &enrichment.suggestions));
    }
    html
}

/// The full report as JSON, safe to place inside a script element
fn render_embedded_json(report: &AuditReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(format!(
        "<script type=\"application/json\" id=\"{}\">\n{}\n</script>\n",
        REPORT_DATA_ID,
        escape_script(&json)
    ))
}

/// `</` would end the script element early; `<\/` is the same JSON string
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\u0021--")
}

fn render_footer() -> String {
    r#"<div class="footer">
    <p>Generated by geo-audit</p>
</div>
"#
    .to_string()
}

fn priority_badge(priority: Priority) -> String {
    format!(
        "<span class=\"priority-badge priority-{p}\">{p}</span>",
        p = priority
    )
}

fn bar_class(score: f64) -> &'static str {
    if score >= 80.0 {
        "bar-good"
    } else if score >= 60.0 {
        "bar-moderate"
    } else {
        "bar-poor"
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Embedded CSS
const CSS: &str = r#"
:root {
    --primary-color: #0f766e;
    --background-color: #f8fafc;
    --text-color: #1e293b;
    --muted-color: #64748b;
    --card-background: white;
    --border-color: #e2e8f0;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: var(--text-color);
    background: var(--background-color);
    padding: 2rem;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    background: var(--card-background);
    border-radius: 12px;
    box-shadow: 0 4px 6px -1px rgba(0,0,0,0.1);
    overflow: hidden;
}

.header {
    background: linear-gradient(135deg, #0f766e 0%, #0284c7 100%);
    color: white;
    padding: 2.5rem 2rem;
    text-align: center;
}

.header h1 { font-size: 2.25rem; margin-bottom: 0.25rem; }
.header .target { font-family: monospace; font-size: 1.05rem; word-break: break-all; }
.header .timestamp { opacity: 0.9; font-size: 0.9rem; }

.content { padding: 2rem; }

.grade-section {
    text-align: center;
    padding: 2rem;
    background: #f1f5f9;
    border-radius: 8px;
    margin-bottom: 2rem;
}

.grade-badge {
    display: inline-block;
    font-size: 3.5rem;
    font-weight: bold;
    width: 110px;
    height: 110px;
    line-height: 110px;
    border-radius: 50%;
    margin-bottom: 1rem;
    color: white;
}

.grade-A { background: #10b981; }
.grade-B { background: #22c55e; }
.grade-C { background: #eab308; }
.grade-D { background: #f97316; }
.grade-F { background: #ef4444; }

.score { font-size: 1.5rem; color: var(--muted-color); }
.grade-description, .muted { color: var(--muted-color); }

.section { margin-bottom: 2rem; }
.section-title {
    font-size: 1.4rem;
    margin-bottom: 1rem;
    padding-bottom: 0.5rem;
    border-bottom: 2px solid var(--border-color);
}

.metrics-grid, .stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
    gap: 1rem;
}

.metric-card, .stat-item {
    border: 1px solid var(--border-color);
    border-radius: 8px;
    padding: 1.25rem;
}

.metric-card h3 {
    font-size: 0.85rem;
    color: var(--muted-color);
    margin-bottom: 0.5rem;
    text-transform: uppercase;
}

.metric-value, .stat-value { font-size: 2rem; font-weight: bold; }
.metric-note, .breakdown { font-size: 0.85rem; color: var(--muted-color); margin-top: 0.5rem; }
.breakdown { list-style: none; }
.stat-item { text-align: center; }
.stat-label { font-size: 0.85rem; color: var(--muted-color); }

.metric-bar { height: 8px; background: #e2e8f0; border-radius: 4px; overflow: hidden; }
.metric-bar-fill { height: 100%; border-radius: 4px; }
.bar-good { background: #10b981; }
.bar-moderate { background: #f59e0b; }
.bar-poor { background: #ef4444; }

.entities { margin-top: 1rem; }
.entities h3 { font-size: 0.85rem; color: var(--muted-color); text-transform: uppercase; }
.tag {
    display: inline-block;
    background: #e0f2fe;
    color: #0369a1;
    padding: 0.15rem 0.6rem;
    border-radius: 6px;
    margin: 0.2rem 0.2rem 0 0;
    font-size: 0.875rem;
}

table.checks { width: 100%; border-collapse: collapse; font-size: 0.95rem; }
table.checks th, table.checks td {
    text-align: left;
    padding: 0.6rem 0.75rem;
    border-bottom: 1px solid var(--border-color);
    vertical-align: top;
}
table.checks th { background: #f8fafc; color: var(--muted-color); font-weight: 600; }

.status-pass { color: #059669; font-weight: 600; }
.status-fail { color: #dc2626; font-weight: 600; }

.priority-badge {
    padding: 0.1rem 0.6rem;
    border-radius: 6px;
    font-size: 0.8rem;
    font-weight: 600;
    color: white;
    text-transform: uppercase;
}
.priority-high { background: #ea580c; }
.priority-medium { background: #ca8a04; }
.priority-low { background: #2563eb; }

.suggestion-list { display: flex; flex-direction: column; gap: 0.75rem; }
.suggestion-card {
    border: 1px solid var(--border-color);
    border-left: 4px solid var(--primary-color);
    border-radius: 6px;
    padding: 0.75rem 1rem;
}
.suggestion-key { font-family: monospace; font-weight: 600; }
.example-fix {
    margin-top: 0.5rem;
    padding: 0.75rem;
    background: #f1f5f9;
    border-radius: 4px;
    overflow-x: auto;
    font-size: 0.85rem;
}

.top-issues { padding-left: 1.5rem; }
.notes { margin-top: 1rem; font-style: italic; }

.footer {
    text-align: center;
    padding: 1.5rem;
    color: var(--muted-color);
    border-top: 1px solid var(--border-color);
}

@media (max-width: 768px) {
    body { padding: 1rem; }
    .header { padding: 2rem 1rem; }
    .header h1 { font-size: 1.6rem; }
    .grade-badge { width: 80px; height: 80px; line-height: 80px; font-size: 2.5rem; }
}

@media print {
    body { padding: 0; background: white; }
    .container { box-shadow: none; }
    .suggestion-card { page-break-inside: avoid; }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{enriched_report, test_report};

    fn embedded_json(html: &str) -> serde_json::Value {
        let open = format!("<script type=\"application/json\" id=\"{}\">", REPORT_DATA_ID);
        let start = html.find(&open).expect("json block") + open.len();
        let end = start + html[start..].find("</script>").expect("closing tag");
        serde_json::from_str(&html[start..end]).expect("embedded JSON parses")
    }

    #[test]
    fn test_html_render_structure() {
        let report = test_report();
        let html = render(&report).expect("render HTML");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("Rubric Score:"));
        assert_eq!(html.matches("<tr><td>").count(), 12);
        assert!(html.contains("Skipped: disabled"));
    }

    #[test]
    fn test_embedded_json_matches_report() {
        let report = enriched_report();
        let html = render(&report).expect("render HTML");
        let json = embedded_json(&html);
        assert_eq!(json, serde_json::to_value(&report).unwrap());
    }

    #[test]
    fn test_script_content_cannot_close_early() {
        let mut report = enriched_report();
        report.target = "https://example.com/</script><script>alert(1)".into();
        let html = render(&report).expect("render HTML");
        // one opening and one closing script tag, and the JSON still parses
        assert_eq!(html.matches("</script>").count(), 1);
        assert_eq!(embedded_json(&html)["target"], report.target);
        assert!(!html.contains("<p class=\"target\">https://example.com/</script>"));
    }

    #[test]
    fn test_enrichment_sections() {
        let html = render(&enriched_report()).expect("render HTML");
        assert!(html.contains("AI Suggestions (1)"));
        assert!(html.contains("Add &lt;FAQ&gt; markup"));
        assert!(html.contains("opening hours"));
        assert!(html.contains("Close to local-ready."));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
