use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

use crate::collab::KeywordSource;
use crate::model::{App, Keyword, KeywordOrigin, KeywordSuggestions};

lazy_static! {
    static ref SPACES: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref CORPORATE_SUFFIXES: HashSet<&'static str> =
        ["inc", "llc", "ltd", "corp", "co"].into_iter().collect();
}

/// NFKC, lower-case, trimmed, inner whitespace collapsed to single spaces.
pub fn normalize(text: &str) -> String {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    SPACES.replace_all(folded.trim(), " ").into_owned()
}

fn has_word_char(s: &str) -> bool { s.chars().any(char::is_alphanumeric) }

fn strip_punctuation(word: &str) -> String {
    word.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Ordered, de-duplicated candidate set. First insertion of a normalized form wins.
#[derive(Debug, Default)]
struct Candidates {
    seen: HashSet<String>,
    items: Vec<Keyword>,
}

impl Candidates {
    fn push(&mut self, text: &str, origin: KeywordOrigin) {
        let text = normalize(text);
        if text.is_empty() || self.seen.contains(&text) { return; }
        self.seen.insert(text.clone());
        self.items.push(Keyword { text, origin });
    }
}

/// Derives search terms from an app's own listing.
#[derive(Debug, Clone)]
pub struct KeywordGenerator {
    suggested_words: usize,
    suggested_phrases: usize,
}

impl Default for KeywordGenerator {
    fn default() -> Self { Self { suggested_words: 10, suggested_phrases: 10 } }
}

impl KeywordGenerator {
    pub fn new(suggested_words: usize, suggested_phrases: usize) -> Self {
        Self { suggested_words, suggested_phrases }
    }

    /// Candidates from title, genre and developer only. Deterministic.
    pub fn candidates(&self, app: &App) -> Vec<Keyword> {
        let mut out = Candidates::default();

        let title = normalize(&app.name);
        let mut title_words: Vec<String> = Vec::new();
        for w in title.split(' ').filter(|w| has_word_char(w)) {
            if !title_words.iter().any(|t| t == w) {
                title_words.push(w.to_string());
            }
        }
        for w in &title_words {
            out.push(w, KeywordOrigin::TitleWord);
        }
        out.push(&title, KeywordOrigin::TitlePhrase);
        for w in &title_words {
            let stripped = strip_punctuation(w);
            if stripped != *w {
                out.push(&stripped, KeywordOrigin::TitleWord);
            }
        }
        for a in &title_words {
            for b in &title_words {
                if a != b {
                    out.push(&format!("{a} {b}"), KeywordOrigin::TitlePhrase);
                }
            }
        }

        if let Some(genre) = app.genre.as_deref().map(normalize).filter(|g| !g.is_empty()) {
            let genre_words: Vec<&str> = genre.split(' ').filter(|w| has_word_char(w)).collect();
            for g in &genre_words {
                out.push(g, KeywordOrigin::GenreWord);
            }
            if genre_words.len() > 1 {
                out.push(&genre, KeywordOrigin::GenreWord);
            }
            for t in &title_words {
                for g in &genre_words {
                    if t != g {
                        out.push(&format!("{t} {g}"), KeywordOrigin::GenreCrossTerm);
                    }
                }
            }
        }

        for raw in normalize(&app.developer).split(' ') {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if word.chars().count() <= 2 || CORPORATE_SUFFIXES.contains(word) { continue; }
            out.push(word, KeywordOrigin::DeveloperWord);
        }

        out.items
    }

    /// Full pipeline: listing-derived candidates, then best-effort suggestions,
    /// de-duplicated and capped at `limit` when one is given.
    pub async fn generate(&self, app: &App, limit: Option<usize>, source: Option<&dyn KeywordSource>) -> Vec<Keyword> {
        let base = self.candidates(app);
        let mut out = Candidates::default();
        for k in base {
            out.push(&k.text, k.origin);
        }
        if let Some(source) = source {
            match source.suggest(&app.name, &app.description).await {
                Some(suggestions) => self.merge(&mut out, suggestions),
                None => tracing::debug!(app_id = app.id, "no keyword suggestions available"),
            }
        }
        let mut items = out.items;
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        items
    }

    fn merge(&self, out: &mut Candidates, suggestions: KeywordSuggestions) {
        let before = out.items.len();
        for w in suggestions.single_words.iter().take(self.suggested_words) {
            out.push(w, KeywordOrigin::Suggested);
        }
        for p in suggestions.phrases.iter().take(self.suggested_phrases) {
            out.push(p, KeywordOrigin::Suggested);
        }
        tracing::debug!(added = out.items.len() - before, "merged keyword suggestions");
    }
}
