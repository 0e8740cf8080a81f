//! HTML signal extraction
//!
//! Turns a raw HTML string into [`DocumentFacts`]: the immutable set of
//! structural values every later stage reads. Extraction never fails.
//! Missing elements become `None`/empty, and JSON-LD blocks that do not
//! parse are kept as [`StructuredData::Malformed`] so they still count as
//! "a block exists".

mod patterns;

pub use patterns::{coordinate_matches, phone_matches, PatternMatches, SAMPLE_LIMIT};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| {
            Selector::parse($css).expect(concat!("invalid selector ", $css, " - this is a bug"))
        });
    };
}

selector!(HTML_SEL, "html");
selector!(BODY_SEL, "body");
selector!(TITLE_SEL, "title");
selector!(META_SEL, "meta");
selector!(HEADING_SEL, "h1, h2, h3, h4, h5, h6");
selector!(CANONICAL_SEL, "link[rel]");
selector!(JSON_LD_SEL, "script[type]");
selector!(IMG_SEL, "img");
selector!(PARAGRAPH_SEL, "p");
selector!(HREF_SEL, "a[href], link[href]");

/// Elements whose text is never visible
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// File names that advertise machine-readable site summaries for LLM crawlers
const TRAINING_FILES: &[&str] = &["llms.txt", "llms-full.txt", "ai.txt"];

static LOCAL_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)localbusiness|organization|place").expect("valid local type regex")
});

/// One JSON-LD block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum StructuredData {
    Parsed(serde_json::Value),
    Malformed,
}

impl StructuredData {
    /// Objects worth inspecting for `@type`/fields.
    ///
    /// Top-level objects, objects inside a top-level array, and objects inside
    /// an `@graph` array of either. Malformed blocks yield nothing.
    pub fn nodes(&self) -> Vec<&serde_json::Map<String, serde_json::Value>> {
        let StructuredData::Parsed(value) = self else {
            return Vec::new();
        };
        let mut roots = Vec::new();
        match value {
            serde_json::Value::Object(map) => roots.push(map),
            serde_json::Value::Array(items) => {
                roots.extend(items.iter().filter_map(|v| v.as_object()));
            }
            _ => {}
        }

        let mut nodes = Vec::new();
        for root in roots {
            nodes.push(root);
            if let Some(graph) = root.get("@graph").and_then(|g| g.as_array()) {
                nodes.extend(graph.iter().filter_map(|v| v.as_object()));
            }
        }
        nodes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFact {
    pub src: Option<String>,
    /// True when `alt` exists and is not blank
    pub has_alt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

/// Structural facts extracted from one HTML document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentFacts {
    pub lang: Option<String>,
    pub charset: Option<String>,
    /// Content of `<meta name="viewport">`
    pub viewport: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub headings: Vec<Heading>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub structured_data: Vec<StructuredData>,
    pub images: Vec<ImageFact>,
    pub geo_meta: Vec<MetaTag>,
    pub og_locale: Option<String>,
    pub og_site_name: Option<String>,
    pub alternate_links: Vec<AlternateLink>,
    pub training_file_links: Vec<String>,
    pub paragraph_count: usize,
    pub phones: PatternMatches,
    pub coordinates: PatternMatches,
    pub body_text: String,
}

impl DocumentFacts {
    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.level == 1).count()
    }

    pub fn images_with_alt(&self) -> usize {
        self.images.iter().filter(|i| i.has_alt).count()
    }

    /// True when some parsed node's `@type` looks like a local business, or the
    /// node carries an address or telephone.
    pub fn has_local_business_schema(&self) -> bool {
        self.local_business_types().is_some()
    }

    /// Types of the first matching local-business node (empty when the match
    /// came from an address/telephone field on an untyped node).
    pub fn local_business_types(&self) -> Option<Vec<String>> {
        self.structured_data
            .iter()
            .flat_map(|block| block.nodes())
            .find_map(|node| {
                let types = node_types(node);
                let typed = types.iter().any(|t| LOCAL_TYPE_RE.is_match(t));
                let fielded = node.contains_key("address") || node.contains_key("telephone");
                (typed || fielded).then_some(types)
            })
    }

    pub fn malformed_structured_data(&self) -> usize {
        self.structured_data
            .iter()
            .filter(|b| matches!(b, StructuredData::Malformed))
            .count()
    }

    pub fn has_geo_meta(&self) -> bool {
        !self.geo_meta.is_empty()
    }
}

fn node_types(node: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    match node.get("@type") {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract every structural fact from `html`.
pub fn extract_facts(html: &str) -> DocumentFacts {
    let document = Html::parse_document(html);
    let body_text = visible_text(&document);

    let mut facts = DocumentFacts {
        lang: document
            .select(&HTML_SEL)
            .next()
            .and_then(|el| non_blank(el.value().attr("lang"))),
        title: document
            .select(&TITLE_SEL)
            .next()
            .and_then(|el| non_blank(Some(el.text().collect::<String>().as_str()))),
        headings: extract_headings(&document),
        structured_data: extract_structured_data(&document),
        images: document
            .select(&IMG_SEL)
            .map(|el| ImageFact {
                src: non_blank(el.value().attr("src")),
                has_alt: el
                    .value()
                    .attr("alt")
                    .is_some_and(|alt| !alt.trim().is_empty()),
            })
            .collect(),
        paragraph_count: document.select(&PARAGRAPH_SEL).count(),
        phones: phone_matches(&body_text),
        coordinates: coordinate_matches(&body_text),
        ..Default::default()
    };

    extract_meta(&document, &mut facts);
    extract_links(&document, &mut facts);
    facts.body_text = body_text;

    tracing::debug!(
        headings = facts.headings.len(),
        images = facts.images.len(),
        json_ld = facts.structured_data.len(),
        words = facts.body_text.split_whitespace().count(),
        "Extracted document facts"
    );
    facts
}

fn extract_meta(document: &Html, facts: &mut DocumentFacts) {
    for el in document.select(&META_SEL) {
        let attrs = el.value();

        if facts.charset.is_none() {
            if let Some(cs) = non_blank(attrs.attr("charset")) {
                facts.charset = Some(cs);
            } else if attrs
                .attr("http-equiv")
                .is_some_and(|h| h.eq_ignore_ascii_case("content-type"))
            {
                facts.charset = attrs.attr("content").and_then(charset_from_content_type);
            }
        }

        let Some(name) = attrs.attr("name").or_else(|| attrs.attr("property")) else {
            continue;
        };
        let name = name.trim().to_lowercase();
        let content = attrs.attr("content").unwrap_or("").trim().to_string();

        match name.as_str() {
            "viewport" if facts.viewport.is_none() => facts.viewport = Some(content),
            "description" if facts.description.is_none() => facts.description = Some(content),
            "robots" if facts.robots.is_none() => facts.robots = Some(content),
            "og:locale" if facts.og_locale.is_none() => {
                facts.og_locale = non_blank(Some(content.as_str()))
            }
            "og:site_name" if facts.og_site_name.is_none() => {
                facts.og_site_name = non_blank(Some(content.as_str()))
            }
            n if n.starts_with("geo.") || n.starts_with("geo:") || n == "icbm" => {
                facts.geo_meta.push(MetaTag {
                    name: n.to_string(),
                    content,
                });
            }
            _ => {}
        }
    }
}

fn extract_links(document: &Html, facts: &mut DocumentFacts) {
    for el in document.select(&CANONICAL_SEL) {
        let rels: Vec<String> = el
            .value()
            .attr("rel")
            .unwrap_or("")
            .split_whitespace()
            .map(|r| r.to_lowercase())
            .collect();
        let href = el.value().attr("href").map(str::trim).unwrap_or("");

        if rels.iter().any(|r| r == "canonical") && facts.canonical.is_none() {
            facts.canonical = non_blank(Some(href));
        }
        if rels.iter().any(|r| r == "alternate") {
            if let Some(lang) = non_blank(el.value().attr("hreflang")) {
                facts.alternate_links.push(AlternateLink {
                    hreflang: lang,
                    href: href.to_string(),
                });
            }
        }
    }

    for el in document.select(&HREF_SEL) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let path = href
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let is_training = TRAINING_FILES
            .iter()
            .any(|f| path == *f || path.ends_with(&format!("/{f}")));
        if is_training && !facts.training_file_links.iter().any(|l| l == href) {
            facts.training_file_links.push(href.to_string());
        }
    }
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADING_SEL)
        .filter_map(|el| {
            let level = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            Some(Heading {
                level,
                text: collapse_ws(&el.text().collect::<String>()),
            })
        })
        .collect()
}

fn extract_structured_data(document: &Html) -> Vec<StructuredData> {
    document
        .select(&JSON_LD_SEL)
        .filter(|el| {
            el.value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .map(|el| {
            let raw: String = el.text().collect();
            match serde_json::from_str::<serde_json::Value>(raw.trim()) {
                Ok(value) => StructuredData::Parsed(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Malformed JSON-LD block");
                    StructuredData::Malformed
                }
            }
        })
        .collect()
}

/// Flattened visible text of the body, whitespace-collapsed.
fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY_SEL)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            ElementRef::wrap(a).is_some_and(|el| HIDDEN_TEXT_TAGS.contains(&el.value().name()))
        });
        if !hidden && !text.trim().is_empty() {
            parts.push(text);
        }
    }
    collapse_ws(&parts.join(" "))
}

fn charset_from_content_type(content: &str) -> Option<String> {
    content
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, v)| non_blank(Some(v.trim_matches(['"', '\'']))))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
