use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RankError;

pub type AppId = u64;

/// Regional marketplace code, always two lower-case ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Storefront(String);

impl Storefront {
    pub fn as_str(&self) -> &str { &self.0 }

    /// Map a country name as found in keyword report files to its storefront.
    /// Unknown names fall back to the US store.
    pub fn from_country_name(name: &str) -> Self {
        let code = match name.trim() {
            "United States" => "us",
            "United Kingdom" => "gb",
            "Canada" => "ca",
            "Australia" => "au",
            "Japan" => "jp",
            "Germany" => "de",
            "France" => "fr",
            "Spain" => "es",
            "Italy" => "it",
            other => return other.parse().unwrap_or_default(),
        };
        Storefront(code.to_string())
    }
}

impl Default for Storefront {
    fn default() -> Self { Storefront("us".to_string()) }
}

impl FromStr for Storefront {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Storefront(s.to_ascii_lowercase()))
        } else {
            Err(RankError::invalid(format!("storefront must be a two-letter country code, got {s:?}")))
        }
    }
}

impl TryFrom<String> for Storefront {
    type Error = RankError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Storefront> for String {
    fn from(s: Storefront) -> Self { s.0 }
}

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Snapshot of one marketplace listing as returned by a detail lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub developer: String,
    /// Average star rating, 0-5. Absent for unrated apps.
    pub rating: Option<f64>,
    pub rating_count: u64,
    pub release_date: Option<String>,
    pub current_version_release_date: Option<String>,
    pub genre: Option<String>,
    pub bundle_id: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub content_rating: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordOrigin {
    TitleWord,
    TitlePhrase,
    GenreWord,
    GenreCrossTerm,
    DeveloperWord,
    Suggested,
}

/// A normalized candidate search term and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub origin: KeywordOrigin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSuggestions {
    #[serde(default)]
    pub single_words: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Where one app sits in the ranked results for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRanking {
    pub keyword: String,
    /// 1-based position, absent when the app is not in the results.
    pub rank: Option<u32>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    NewFree,
    NewPaid,
}

/// One row of a chart feed. Carries only what the feed itself reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub id: AppId,
    pub name: String,
    pub developer: String,
    pub price: f64,
    pub category: Option<String>,
}
