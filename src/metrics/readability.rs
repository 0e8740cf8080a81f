//! Flesch reading-ease over flattened body text

use crate::models::{Readability, ReadabilityLabel};

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// Vowel-group syllable estimate for one token.
///
/// Counts runs of vowels, drops one for a trailing silent `e` when there is
/// more than one group, and never returns less than one.
pub fn syllables(word: &str) -> usize {
    let letters: String = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let mut groups = 0;
    let mut in_group = false;
    for c in letters.chars() {
        let vowel = VOWELS.contains(&c);
        if vowel && !in_group {
            groups += 1;
        }
        in_group = vowel;
    }
    if letters.ends_with('e') && groups > 1 {
        groups -= 1;
    }
    groups.max(1)
}

/// Non-empty fragments between runs of `.`, `!` and `?`
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`
pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> i64 {
    let words = words.max(1) as f64;
    let sentences = sentences.max(1) as f64;
    let score = 206.835 - 1.015 * (words / sentences) - 84.6 * (syllables as f64 / words);
    score.round() as i64
}

/// Readability block for `text`. Word and sentence counts are floored at one.
pub fn analyze(text: &str, paragraphs: usize) -> Readability {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let syllable_total: usize = tokens.iter().map(|w| syllables(w)).sum();
    let words = tokens.len().max(1);
    let sentences = sentence_count(text).max(1);
    let score = flesch_reading_ease(words, sentences, syllable_total);

    Readability {
        score,
        label: ReadabilityLabel::from_score(score),
        paragraphs,
        words,
        sentences,
        syllables: syllable_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syllable_heuristic() {
        assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("table"), 1); // vowel groups a, e minus silent e
        assert_eq!(syllables("beautiful"), 3);
        assert_eq!(syllables("the"), 1);
        assert_eq!(syllables("Rhythm"), 1);
        assert_eq!(syllables("2024"), 1);
        assert_eq!(syllables("hello,"), 2);
    }

    #[test]
    fn test_sentence_count() {
        assert_eq!(sentence_count("One. Two! Three? "), 3);
        assert_eq!(sentence_count("Wait... what?!"), 2);
        assert_eq!(sentence_count(""), 0);
    }

    #[test]
    fn test_simple_text_is_easy() {
        let r = analyze("The cat sat on the mat. The dog ran.", 1);
        assert_eq!(r.words, 9);
        assert_eq!(r.sentences, 2);
        assert_eq!(r.syllables, 9);
        // 206.835 - 1.015*4.5 - 84.6*1.0 = 117.6675
        assert_eq!(r.score, 118);
        assert_eq!(r.label, ReadabilityLabel::Easy);
    }

    #[test]
    fn test_empty_text_degrades_to_floor() {
        let r = analyze("", 0);
        assert_eq!(r.words, 1);
        assert_eq!(r.sentences, 1);
        assert_eq!(r.syllables, 0);
        assert_eq!(r.score, 206);
        assert_eq!(r.paragraphs, 0);
    }

    #[test]
    fn test_dense_text_is_difficult() {
        let text = "Institutionalization necessitates comprehensive organizational \
                    reconfiguration notwithstanding considerable administrative \
                    implementation complexity";
        let r = analyze(text, 1);
        assert_eq!(r.label, ReadabilityLabel::VeryDifficult);
    }
}
