//! Per-app metrics, search summaries and the v1 competitiveness policy.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::dates::{days_since, parse_release_date, ratings_per_day};
use crate::matching::PhraseMatcher;
use crate::model::App;

/// Share of a result list, youngest first, treated as the "newest" bucket.
pub const NEWEST_SHARE: f64 = 0.3;

const TRAFFIC_CAP: f64 = 100.0;
const FRESHNESS_CAP_DAYS: f64 = 365.0;
const VELOCITY_RATIO_CAP: f64 = 5.0;
const WEIGHT_TRAFFIC: f64 = 0.35;
const WEIGHT_FRESHNESS: f64 = 0.25;
const WEIGHT_TITLE: f64 = 0.20;
const WEIGHT_VELOCITY: f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedApp {
    /// Position in the ranked search that produced this app.
    pub rank: u32,
    pub app: App,
    pub title_match_score: u32,
    pub description_match_score: u32,
    pub original_release_date: Option<String>,
    pub latest_release_date: Option<String>,
    pub age_days: u32,
    pub freshness_days: u32,
    pub ratings_per_day: f64,
}

impl AnalyzedApp {
    pub fn new(rank: u32, app: App, matcher: &PhraseMatcher, now: OffsetDateTime) -> Self {
        let released = app.release_date.as_deref().and_then(parse_release_date);
        let updated = app.current_version_release_date.as_deref().and_then(parse_release_date);
        let age_days = days_since(released, now);
        let freshness_days = days_since(updated, now);
        Self {
            rank,
            title_match_score: matcher.title_score(&app.name),
            description_match_score: matcher.description_score(&app.description),
            original_release_date: app.release_date.clone(),
            latest_release_date: app.current_version_release_date.clone(),
            age_days,
            freshness_days,
            ratings_per_day: ratings_per_day(app.rating_count, age_days),
            app,
        }
    }
}

/// Aggregates over one keyword's analyzed result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub app_count: usize,
    pub avg_age_days: f64,
    pub median_age_days: f64,
    pub avg_freshness_days: f64,
    /// Mean over rated apps only.
    pub avg_rating: f64,
    pub avg_rating_count: f64,
    pub avg_title_match_score: f64,
    pub avg_description_match_score: f64,
    pub total_title_match_score: u32,
    pub total_description_match_score: u32,
    pub avg_ratings_per_day: f64,
    pub newest_count: usize,
    pub established_count: usize,
    pub newest_rating_share: f64,
    pub established_rating_share: f64,
    pub newest_velocity: f64,
    pub established_velocity: f64,
    pub velocity_ratio: f64,
    pub age_ratio: f64,
    pub competitiveness_v1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSignal {
    HeatingUp,
    Stable,
    EstablishedDominated,
}

impl TrendSignal {
    pub fn from_velocity_ratio(ratio: f64) -> Self {
        if ratio > 1.5 {
            TrendSignal::HeatingUp
        } else if ratio < 0.5 {
            TrendSignal::EstablishedDominated
        } else {
            TrendSignal::Stable
        }
    }
}

/// Category-level momentum label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Hot,
    Growing,
    Emerging,
}

impl TrendLabel {
    pub fn from_velocity(avg_velocity: f64) -> Self {
        if avg_velocity > 5.0 {
            TrendLabel::Hot
        } else if avg_velocity > 1.0 {
            TrendLabel::Growing
        } else {
            TrendLabel::Emerging
        }
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Size of the newest bucket: ceil(0.3 * n), at least one for non-empty lists.
pub fn newest_count(n: usize) -> usize {
    if n == 0 { 0 } else { ((n as f64 * NEWEST_SHARE).ceil() as usize).max(1) }
}

pub fn summarize(apps: &[AnalyzedApp]) -> SearchSummary {
    let n = apps.len();
    if n == 0 {
        return SearchSummary::default();
    }

    let total_title: u32 = apps.iter().map(|a| a.title_match_score).sum();
    let total_desc: u32 = apps.iter().map(|a| a.description_match_score).sum();
    let total_ratings: u64 = apps.iter().map(|a| a.app.rating_count).sum();

    let mut by_age: Vec<&AnalyzedApp> = apps.iter().collect();
    by_age.sort_by_key(|a| a.age_days);
    let split = newest_count(n);
    let (newest, established) = by_age.split_at(split);

    let share = |bucket: &[&AnalyzedApp]| {
        if total_ratings == 0 { 0.0 } else {
            bucket.iter().map(|a| a.app.rating_count).sum::<u64>() as f64 / total_ratings as f64
        }
    };
    let newest_velocity = mean(newest.iter().map(|a| a.ratings_per_day));
    let established_velocity = mean(established.iter().map(|a| a.ratings_per_day));
    let velocity_ratio = if established_velocity == 0.0 { 0.0 } else { newest_velocity / established_velocity };

    let newest_age = mean(newest.iter().map(|a| a.age_days as f64));
    let established_age = mean(established.iter().map(|a| a.age_days as f64));
    let age_ratio = if newest_age == 0.0 { 0.0 } else { established_age / newest_age };
    let sorted_ages: Vec<f64> = by_age.iter().map(|a| a.age_days as f64).collect();

    let mut summary = SearchSummary {
        app_count: n,
        avg_age_days: mean(apps.iter().map(|a| a.age_days as f64)),
        median_age_days: median(&sorted_ages),
        avg_freshness_days: mean(apps.iter().map(|a| a.freshness_days as f64)),
        avg_rating: mean(apps.iter().filter_map(|a| a.app.rating)),
        avg_rating_count: total_ratings as f64 / n as f64,
        avg_title_match_score: total_title as f64 / n as f64,
        avg_description_match_score: total_desc as f64 / n as f64,
        total_title_match_score: total_title,
        total_description_match_score: total_desc,
        avg_ratings_per_day: mean(apps.iter().map(|a| a.ratings_per_day)),
        newest_count: newest.len(),
        established_count: established.len(),
        newest_rating_share: share(newest),
        established_rating_share: share(established),
        newest_velocity,
        established_velocity,
        velocity_ratio,
        age_ratio,
        competitiveness_v1: 0.0,
    };
    summary.competitiveness_v1 = competitiveness_v1(&summary);
    summary
}

/// Versioned scoring policy "v1": 0-100, higher means harder to break into.
/// An empty result list scores 0.
pub fn competitiveness_v1(s: &SearchSummary) -> f64 {
    if s.app_count == 0 { return 0.0; }
    let traffic = s.avg_ratings_per_day.min(TRAFFIC_CAP);
    let freshness = (100.0 - s.avg_freshness_days.min(FRESHNESS_CAP_DAYS) / FRESHNESS_CAP_DAYS * 100.0).max(0.0);
    let title = s.avg_title_match_score * 20.0;
    let velocity = (100.0 - s.velocity_ratio.min(VELOCITY_RATIO_CAP) * 20.0).max(0.0);
    let score = WEIGHT_TRAFFIC * traffic
        + WEIGHT_FRESHNESS * freshness
        + WEIGHT_TITLE * title
        + WEIGHT_VELOCITY * velocity;
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) }
}
