use serde::{Deserialize, Serialize};
use std::time::Instant;
use time::OffsetDateTime;

use crate::config::{ANALYSIS_DEPTH, MAX_COMPARE_KEYWORDS};
use crate::engine::Engine;
use crate::error::{RankError, RankResult};
use crate::matching::PhraseMatcher;
use crate::model::{App, AppId, Storefront};
use crate::scoring::{summarize, AnalyzedApp, SearchSummary, TrendSignal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub keyword: String,
    pub storefront: Storefront,
    pub competitiveness: f64,
    pub trend_signal: TrendSignal,
    pub summary: SearchSummary,
    pub apps: Vec<AnalyzedApp>,
}

impl KeywordAnalysis {
    pub fn app_ids(&self) -> Vec<AppId> {
        self.apps.iter().map(|a| a.app.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordComparison {
    Analyzed {
        keyword: String,
        competitiveness: f64,
        trend_signal: TrendSignal,
        avg_rating: f64,
        avg_ratings_per_day: f64,
        avg_rating_count: f64,
    },
    Failed {
        keyword: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub comparisons: Vec<KeywordComparison>,
    pub recommendation: Option<String>,
}

/// Score a fetched result list against `keyword` as of `now`.
pub fn analyze_apps(keyword: &str, ranked: Vec<(u32, App)>, now: OffsetDateTime) -> (Vec<AnalyzedApp>, SearchSummary) {
    let matcher = PhraseMatcher::new(keyword);
    let apps: Vec<AnalyzedApp> = ranked
        .into_iter()
        .map(|(rank, app)| AnalyzedApp::new(rank, app, &matcher, now))
        .collect();
    let summary = summarize(&apps);
    (apps, summary)
}

/// Lowest competitiveness wins; the first keyword wins a tie.
pub fn recommend(comparisons: &[KeywordComparison]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for c in comparisons {
        if let KeywordComparison::Analyzed { keyword, competitiveness, .. } = c {
            if best.map_or(true, |(_, score)| *competitiveness < score) {
                best = Some((keyword, *competitiveness));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

impl Engine {
    /// Competitive metrics for the top 20 results of `keyword`.
    pub async fn analyze_keyword(&self, keyword: &str, storefront: &Storefront) -> RankResult<KeywordAnalysis> {
        let start = Instant::now();
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(RankError::invalid("keyword must not be empty"));
        }
        let ids = self.paced_search(keyword, storefront, ANALYSIS_DEPTH).await?;
        let details = self.enrich(&ids, storefront).await?;

        let ranked: Vec<(u32, App)> = details
            .into_iter()
            .map(|app| {
                let rank = ids.iter().position(|id| *id == app.id).map_or(0, |i| i as u32 + 1);
                (rank, app)
            })
            .collect();
        let (apps, summary) = analyze_apps(keyword, ranked, OffsetDateTime::now_utc());
        let trend_signal = TrendSignal::from_velocity_ratio(summary.velocity_ratio);

        tracing::info!(
            keyword,
            %storefront,
            apps = apps.len(),
            competitiveness = summary.competitiveness_v1,
            took_s = start.elapsed().as_secs_f64(),
            "keyword analysis complete"
        );
        Ok(KeywordAnalysis {
            keyword: keyword.to_string(),
            storefront: storefront.clone(),
            competitiveness: summary.competitiveness_v1,
            trend_signal,
            summary,
            apps,
        })
    }

    /// Analyze each keyword independently and recommend the least competitive.
    pub async fn compare_keywords(&self, keywords: &[String], storefront: &Storefront) -> RankResult<ComparisonReport> {
        if keywords.is_empty() {
            return Err(RankError::invalid("at least one keyword is required"));
        }
        if keywords.len() > MAX_COMPARE_KEYWORDS {
            return Err(RankError::invalid(format!(
                "at most {MAX_COMPARE_KEYWORDS} keywords can be compared, got {}",
                keywords.len()
            )));
        }

        let mut comparisons = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            match self.analyze_keyword(keyword, storefront).await {
                Ok(a) => comparisons.push(KeywordComparison::Analyzed {
                    keyword: a.keyword,
                    competitiveness: a.competitiveness,
                    trend_signal: a.trend_signal,
                    avg_rating: a.summary.avg_rating,
                    avg_ratings_per_day: a.summary.avg_ratings_per_day,
                    avg_rating_count: a.summary.avg_rating_count,
                }),
                Err(e) => {
                    tracing::warn!(keyword = %keyword, error = %e, "keyword comparison failed");
                    comparisons.push(KeywordComparison::Failed { keyword: keyword.clone(), error: e.to_string() });
                }
            }
        }
        let recommendation = recommend(&comparisons);
        Ok(ComparisonReport { comparisons, recommendation })
    }
}
