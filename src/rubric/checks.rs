//! The twelve built-in rubric checks

use super::{scaled, Check, CheckOutcome};
use crate::extract::DocumentFacts;
use crate::models::{CheckKey, Priority};
use serde_json::json;

/// Pass threshold for the title. The advice asks for 30-60 characters, but
/// anything from 10 passes; scores depend on the looser threshold.
const TITLE_MIN_CHARS: usize = 10;
const DESCRIPTION_MIN_CHARS: usize = 20;
const DESCRIPTION_IDEAL: std::ops::RangeInclusive<usize> = 50..=160;
const ALT_RATIO_THRESHOLD: f64 = 0.8;

/// All checks in canonical order
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(LangCheck),
        Box::new(CharsetCheck),
        Box::new(ViewportCheck),
        Box::new(TitleCheck),
        Box::new(DescriptionCheck),
        Box::new(H1Check),
        Box::new(CanonicalCheck),
        Box::new(RobotsCheck),
        Box::new(JsonLdCheck),
        Box::new(LocalSchemaCheck),
        Box::new(ImagesAltCheck),
        Box::new(GeoSignalsCheck),
    ]
}

fn char_len(value: Option<&str>) -> usize {
    value.map(|v| v.trim().chars().count()).unwrap_or(0)
}

pub struct LangCheck;

impl Check for LangCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Lang
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add a lang attribute to the <html> element (e.g. <html lang=\"en\">).")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        CheckOutcome::binary(facts.lang.is_some(), weight, json!({ "value": facts.lang }))
    }
}

pub struct CharsetCheck;

impl Check for CharsetCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Charset
    }
    fn priority(&self) -> Priority {
        Priority::Low
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Declare the character encoding with <meta charset=\"utf-8\">.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        CheckOutcome::binary(
            facts.charset.is_some(),
            weight,
            json!({ "value": facts.charset }),
        )
    }
}

pub struct ViewportCheck;

impl Check for ViewportCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Viewport
    }
    fn priority(&self) -> Priority {
        Priority::High
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> for mobile rendering.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        CheckOutcome::binary(
            facts.viewport.is_some(),
            weight,
            json!({ "value": facts.viewport }),
        )
    }
}

pub struct TitleCheck;

impl Check for TitleCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Title
    }
    fn priority(&self) -> Priority {
        Priority::High
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Write a descriptive <title> of 30-60 characters.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let length = char_len(facts.title.as_deref());
        CheckOutcome::binary(
            length >= TITLE_MIN_CHARS,
            weight,
            json!({ "value": facts.title, "length": length }),
        )
    }
}

pub struct DescriptionCheck;

impl Check for DescriptionCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Description
    }
    fn priority(&self) -> Priority {
        Priority::High
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add a meta description of 50-160 characters summarising the page.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let length = char_len(facts.description.as_deref());
        let passed = length >= DESCRIPTION_MIN_CHARS;
        let ideal = DESCRIPTION_IDEAL.contains(&length);
        let awarded = match (passed, ideal) {
            (true, true) => weight,
            (true, false) => scaled(weight, 0.5),
            _ => 0,
        };
        CheckOutcome {
            passed,
            awarded,
            details: json!({ "value": facts.description, "length": length, "ideal_range": ideal }),
        }
    }
}

pub struct H1Check;

impl Check for H1Check {
    fn key(&self) -> CheckKey {
        CheckKey::H1
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Use exactly one <h1> that states the page topic.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let count = facts.h1_count();
        let awarded = match count {
            0 => 0,
            1 => weight,
            _ => scaled(weight, 0.5),
        };
        CheckOutcome {
            passed: count >= 1,
            awarded,
            details: json!({ "count": count }),
        }
    }
}

pub struct CanonicalCheck;

impl Check for CanonicalCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Canonical
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add <link rel=\"canonical\"> pointing at the preferred URL.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        CheckOutcome::binary(
            facts.canonical.is_some(),
            weight,
            json!({ "value": facts.canonical }),
        )
    }
}

pub struct RobotsCheck;

impl Check for RobotsCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Robots
    }
    fn priority(&self) -> Priority {
        Priority::High
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Remove noindex from the robots meta tag so the page can be indexed.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let noindex = facts
            .robots
            .as_deref()
            .is_some_and(|r| r.to_lowercase().contains("noindex"));
        CheckOutcome::binary(!noindex, weight, json!({ "value": facts.robots }))
    }
}

pub struct JsonLdCheck;

impl Check for JsonLdCheck {
    fn key(&self) -> CheckKey {
        CheckKey::JsonLd
    }
    fn priority(&self) -> Priority {
        Priority::High
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add JSON-LD structured data (<script type=\"application/ld+json\">).")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let blocks = facts.structured_data.len();
        CheckOutcome::binary(
            blocks > 0,
            weight,
            json!({ "blocks": blocks, "malformed": facts.malformed_structured_data() }),
        )
    }
}

pub struct LocalSchemaCheck;

impl Check for LocalSchemaCheck {
    fn key(&self) -> CheckKey {
        CheckKey::LocalSchema
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Describe the business with a LocalBusiness/Organization/Place schema including address and telephone.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let types = facts.local_business_types();
        CheckOutcome::binary(types.is_some(), weight, json!({ "types": types }))
    }
}

pub struct ImagesAltCheck;

impl Check for ImagesAltCheck {
    fn key(&self) -> CheckKey {
        CheckKey::ImagesAlt
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Give at least 80% of images meaningful alt text.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let total = facts.images.len();
        let with_alt = facts.images_with_alt();
        if total == 0 {
            return CheckOutcome {
                passed: true,
                awarded: weight,
                details: json!({ "total": 0, "with_alt": 0, "ratio": null }),
            };
        }

        let ratio = with_alt as f64 / total as f64;
        let passed = ratio >= ALT_RATIO_THRESHOLD;
        CheckOutcome {
            passed,
            awarded: if passed { weight } else { scaled(weight, ratio) },
            details: json!({
                "total": total,
                "with_alt": with_alt,
                "ratio": (ratio * 100.0).round() / 100.0,
            }),
        }
    }
}

pub struct GeoSignalsCheck;

impl Check for GeoSignalsCheck {
    fn key(&self) -> CheckKey {
        CheckKey::Geo
    }
    fn priority(&self) -> Priority {
        Priority::Medium
    }
    fn advice(&self) -> Option<&'static str> {
        Some("Add geographic signals: geo.* meta tags, og:locale, a phone number or coordinates.")
    }
    fn evaluate(&self, facts: &DocumentFacts, weight: u32) -> CheckOutcome {
        let passed = facts.has_geo_meta()
            || facts.og_locale.is_some()
            || facts.og_site_name.is_some()
            || !facts.phones.is_empty()
            || !facts.coordinates.is_empty();
        CheckOutcome::binary(
            passed,
            weight,
            json!({
                "geo_meta": facts.geo_meta.iter().map(|m| &m.name).collect::<Vec<_>>(),
                "og_locale": facts.og_locale,
                "og_site_name": facts.og_site_name,
                "phones": facts.phones.samples,
                "coordinates": facts.coordinates.samples,
            }),
        )
    }
}
