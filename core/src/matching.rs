use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::keywords::normalize;

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "and", "or", "but", "&", "for", "with",
            "of", "in", "on", "at", "to", "from", "by",
        ];
        words.iter().copied().collect()
    };
}

/// Highest score a title can earn; reserved for a verbatim phrase match.
pub const EXACT_TITLE_SCORE: u32 = 5;

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn ends_with_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    match (rev.next(), rev.next()) {
        (Some('y'), Some(prev)) => prev.is_alphabetic() && !"aeiou".contains(prev),
        _ => false,
    }
}

/// Simple English inflections of one search word. Irregular forms are not
/// covered and downstream scores rely on exactly this set.
pub fn variants(word: &str) -> Vec<String> {
    let mut out = vec![
        word.to_string(),
        format!("{word}s"),
        format!("{word}es"),
    ];
    if ends_with_consonant_y(word) {
        out.push(format!("{}ies", &word[..word.len() - 1]));
    }
    out.push(format!("{word}ing"));
    if let Some(stem) = word.strip_suffix('e') {
        out.push(format!("{stem}ing"));
    }
    out.push(format!("{word}ed"));
    if let Some(stem) = word.strip_suffix('e') {
        out.push(format!("{stem}ed"));
    }
    out
}

/// Pre-compiled matcher for one search phrase.
#[derive(Debug)]
pub struct PhraseMatcher {
    phrase: String,
    word_patterns: Vec<Regex>,
}

impl PhraseMatcher {
    pub fn new(phrase: &str) -> Self {
        let phrase = normalize(phrase);
        let mut seen = HashSet::new();
        let word_patterns = phrase
            .split_whitespace()
            .filter(|w| seen.insert(w.to_string()))
            .filter_map(|w| {
                let alternatives: Vec<String> = variants(w).iter().map(|v| regex::escape(v)).collect();
                Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).ok()
            })
            .collect();
        Self { phrase, word_patterns }
    }

    /// Number of distinct search words with at least one whole-word variant hit.
    fn word_hits(&self, lowered: &str) -> u32 {
        self.word_patterns.iter().filter(|re| re.is_match(lowered)).count() as u32
    }

    /// 5 for a verbatim phrase match (raw, or with stop words removed from the
    /// title), otherwise the count of matched search words.
    pub fn title_score(&self, title: &str) -> u32 {
        let lowered = normalize(title);
        if self.phrase.is_empty() { return 0; }
        if lowered.contains(&self.phrase) { return EXACT_TITLE_SCORE; }
        let without_stopwords = lowered
            .split_whitespace()
            .filter(|t| !is_stopword(t))
            .collect::<Vec<_>>()
            .join(" ");
        if without_stopwords.contains(&self.phrase) { return EXACT_TITLE_SCORE; }
        self.word_hits(&lowered).min(EXACT_TITLE_SCORE)
    }

    pub fn description_score(&self, description: &str) -> u32 {
        self.word_hits(&description.to_lowercase())
    }
}
