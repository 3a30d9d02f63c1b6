//! Cheap textual quality heuristics.
//!
//! Two independent scorers live here. [`heuristic_quality_v1`] is the crawl
//! service's own pass, reported in response metadata. [`heuristic_quality_v2`]
//! adds a vocabulary-uniqueness signal and feeds the learner. They serve
//! different callers and are not expected to agree.

use std::collections::HashSet;

/// Raw counts both heuristics are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSignals {
    pub words: usize,
    /// Count of `.`, `!` and `?`
    pub sentences: usize,
    /// Non-empty blocks separated by blank lines
    pub paragraphs: usize,
    /// Markdown links, `](`
    pub links: usize,
}

impl TextSignals {
    pub fn from_text(text: &str) -> Self {
        Self {
            words: word_count(text),
            sentences: text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count(),
            paragraphs: paragraph_count(text),
            links: text.matches("](").count(),
        }
    }

    /// Links per hundred words.
    pub fn link_density(&self) -> f64 {
        if self.words == 0 {
            return 0.0;
        }
        self.links as f64 * 100.0 / self.words as f64
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn paragraph_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_block = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_block = false;
        } else if !in_block {
            in_block = true;
            count += 1;
        }
    }
    count
}

fn ratio(value: usize, full: f64) -> f64 {
    (value as f64 / full).min(1.0)
}

/// Crawl-pass quality: words 0.4, sentences 0.3, paragraphs 0.3.
pub fn heuristic_quality_v1(text: &str) -> f64 {
    let s = TextSignals::from_text(text);
    if s.words == 0 {
        return 0.0;
    }
    0.4 * ratio(s.words, 1000.0) + 0.3 * ratio(s.sentences, 50.0) + 0.3 * ratio(s.paragraphs, 10.0)
}

/// Learner-pass quality: words 0.3, sentences 0.2, paragraphs 0.2, uniqueness 0.3.
pub fn heuristic_quality_v2(text: &str) -> f64 {
    let s = TextSignals::from_text(text);
    if s.words == 0 {
        return 0.0;
    }
    0.3 * ratio(s.words, 500.0)
        + 0.2 * ratio(s.sentences, 20.0)
        + 0.2 * ratio(s.paragraphs, 5.0)
        + 0.3 * uniqueness(text)
}

/// Distinct lower-cased words over total words.
fn uniqueness(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = words.iter().map(String::as_str).collect();
    distinct.len() as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals() {
        let text = "First line. Second!\n\nAnother paragraph? Yes.\n\n\n[link](https://a.com)";
        let s = TextSignals::from_text(text);
        assert_eq!(s.sentences, 5); // includes the '.' in "a.com"
        assert_eq!(s.paragraphs, 3);
        assert_eq!(s.links, 1);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(heuristic_quality_v1(""), 0.0);
        assert_eq!(heuristic_quality_v2("   \n\n "), 0.0);
    }

    #[test]
    fn test_scores_bounded() {
        let long = "Sentence with several distinct words here. ".repeat(400);
        let v1 = heuristic_quality_v1(&long);
        let v2 = heuristic_quality_v2(&long);
        assert!((0.0..=1.0).contains(&v1));
        assert!((0.0..=1.0).contains(&v2));
    }

    #[test]
    fn test_v2_rewards_varied_vocabulary() {
        let repetitive = "spam spam spam spam spam spam spam spam.";
        let varied = "markets rallied today while bitcoin traders watched closely.";
        assert!(heuristic_quality_v2(varied) > heuristic_quality_v2(repetitive));
    }

    #[test]
    fn test_heuristics_disagree() {
        let text = "Short note. Another one.\n\nSecond block here.";
        assert_ne!(heuristic_quality_v1(text), heuristic_quality_v2(text));
    }
}
