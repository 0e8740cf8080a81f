//! Regex heuristics over flattened body text
//!
//! These are deliberately loose. The phone pattern also matches long digit
//! runs such as order numbers or year ranges ("2019 2020 2021"), and the
//! coordinate pattern matches any `float,float` pair (prices like
//! "12.50, 13.75" included). Scores depend on this exact behavior.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How many raw matches are kept for the report payload
pub const SAMPLE_LIMIT: usize = 3;

/// Digits a phone-like run must contain
const MIN_PHONE_DIGITS: usize = 7;

static PHONE_PATTERN: OnceLock<Regex> = OnceLock::new();
static COORD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn phone_pattern() -> &'static Regex {
    PHONE_PATTERN.get_or_init(|| Regex::new(r"\+?\d[\d\s().\-]{5,}\d").expect("valid phone regex"))
}

fn coord_pattern() -> &'static Regex {
    COORD_PATTERN.get_or_init(|| {
        Regex::new(r"-?\d{1,3}\.\d+\s*,\s*-?\d{1,3}\.\d+").expect("valid coordinate regex")
    })
}

/// Full match count plus the first few matches
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternMatches {
    pub count: usize,
    pub samples: Vec<String>,
}

impl PatternMatches {
    fn collect<'a>(matches: impl Iterator<Item = &'a str>) -> Self {
        let mut out = Self::default();
        for m in matches {
            if out.samples.len() < SAMPLE_LIMIT {
                out.samples.push(m.to_string());
            }
            out.count += 1;
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Phone-like substrings: a digit run of at least seven digits, optionally
/// separated by spaces, dots, dashes or parentheses.
pub fn phone_matches(text: &str) -> PatternMatches {
    PatternMatches::collect(
        phone_pattern()
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|m| m.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS),
    )
}

/// Coordinate-like `lat, lon` pairs.
pub fn coordinate_matches(text: &str) -> PatternMatches {
    PatternMatches::collect(coord_pattern().find_iter(text).map(|m| m.as_str()))
}
