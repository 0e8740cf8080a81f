//! Capitalized-phrase entity candidates
//!
//! A run of capitalized words is treated as a name. This over-matches
//! sentence-initial words ("The", "Our") and under-matches names with
//! lowercase particles ("Rio de Janeiro" yields "Rio" and "Janeiro").

use regex::Regex;
use std::sync::OnceLock;

static ENTITY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn entity_pattern() -> &'static Regex {
    ENTITY_PATTERN
        .get_or_init(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid entity regex"))
}

/// Words that, inside an entity candidate, suggest a street address or locality
pub const LOCALITY_KEYWORDS: &[&str] = &[
    "street", "avenue", "road", "boulevard", "lane", "drive", "plaza", "square", "city",
    "county", "district", "suite",
];

/// Every distinct capitalized phrase in first-seen order
pub fn candidates(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for m in entity_pattern().find_iter(text) {
        let phrase = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if !seen.contains(&phrase) {
            seen.push(phrase);
        }
    }
    seen
}

/// True when any candidate contains a locality keyword as a whole word
pub fn mentions_locality(candidates: &[String]) -> bool {
    candidates.iter().any(|c| {
        c.split_whitespace()
            .any(|w| LOCALITY_KEYWORDS.contains(&w.to_lowercase().as_str()))
    })
}
