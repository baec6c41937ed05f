use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;

use crate::dates::{days_since, parse_release_date, ratings_per_day};
use crate::engine::Engine;
use crate::error::RankResult;
use crate::model::{App, AppId, ChartEntry, ChartKind, Storefront};
use crate::scoring::TrendLabel;

const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingApp {
    pub id: AppId,
    pub name: String,
    pub developer: String,
    pub price: f64,
    /// Absent when no detail record was found for the entry.
    pub ratings_per_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub category: String,
    pub app_count: usize,
    pub average_velocity: f64,
    pub trend_label: TrendLabel,
    pub apps: Vec<TrendingApp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub storefront: Storefront,
    pub groups: Vec<TrendBucket>,
}

fn velocity_of(app: &App, now: OffsetDateTime) -> f64 {
    let released = app.release_date.as_deref().and_then(parse_release_date);
    ratings_per_day(app.rating_count, days_since(released, now))
}

/// Group chart entries by genre and label each group by its mean velocity.
/// Groups keep first-seen order.
pub fn group_by_category(entries: &[ChartEntry], details: &[App], now: OffsetDateTime) -> Vec<TrendBucket> {
    let by_id: HashMap<AppId, &App> = details.iter().map(|a| (a.id, a)).collect();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<TrendingApp>> = HashMap::new();

    for entry in entries {
        let detail = by_id.get(&entry.id);
        let category = detail
            .and_then(|a| a.genre.clone())
            .or_else(|| entry.category.clone())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        if !groups.contains_key(&category) {
            order.push(category.clone());
        }
        groups.entry(category).or_default().push(TrendingApp {
            id: entry.id,
            name: entry.name.clone(),
            developer: entry.developer.clone(),
            price: entry.price,
            ratings_per_day: detail.map(|a| velocity_of(a, now)),
        });
    }

    order
        .into_iter()
        .filter_map(|category| {
            let apps = groups.remove(&category)?;
            let velocities: Vec<f64> = apps.iter().filter_map(|a| a.ratings_per_day).collect();
            let average_velocity = if velocities.is_empty() {
                0.0
            } else {
                velocities.iter().sum::<f64>() / velocities.len() as f64
            };
            Some(TrendBucket {
                category,
                app_count: apps.len(),
                average_velocity,
                trend_label: TrendLabel::from_velocity(average_velocity),
                apps,
            })
        })
        .collect()
}

impl Engine {
    /// Market-level momentum from the new free and new paid charts.
    pub async fn discover_trending(&self, category: Option<&str>, storefront: &Storefront, limit: usize) -> RankResult<TrendReport> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for kind in [ChartKind::NewFree, ChartKind::NewPaid] {
            let chart = self.charts.chart_entries(kind, storefront, limit, category).await?;
            tracing::debug!(?kind, entries = chart.len(), "chart fetched");
            entries.extend(chart.into_iter().filter(|e| seen.insert(e.id)));
        }
        let ids: Vec<AppId> = entries.iter().map(|e| e.id).collect();
        let details = self.enrich(&ids, storefront).await?;
        let groups = group_by_category(&entries, &details, OffsetDateTime::now_utc());
        tracing::info!(%storefront, entries = entries.len(), groups = groups.len(), "trend discovery complete");
        Ok(TrendReport { storefront: storefront.clone(), groups })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry(id: AppId, category: &str) -> ChartEntry {
        ChartEntry { id, name: format!("app {id}"), developer: "dev".into(), price: 0.0, category: Some(category.into()) }
    }

    fn detail(id: AppId, genre: &str, rating_count: u64, released: &str) -> App {
        App {
            id,
            name: format!("app {id}"),
            developer: "dev".into(),
            rating: Some(4.5),
            rating_count,
            release_date: Some(released.into()),
            current_version_release_date: None,
            genre: Some(genre.into()),
            bundle_id: format!("com.example.{id}"),
            price: 0.0,
            description: String::new(),
            version: None,
            content_rating: None,
        }
    }

    #[test]
    fn groups_and_labels() {
        let now = datetime!(2024-01-11 0:00 UTC);
        let entries = vec![entry(1, "Games"), entry(2, "Games"), entry(3, "Health"), entry(4, "Music")];
        let details = vec![
            detail(1, "Games", 100, "2024-01-01T00:00:00Z"), // 10/day
            detail(2, "Games", 20, "2024-01-01T00:00:00Z"),  // 2/day
            detail(3, "Health", 30, "2024-01-01T00:00:00Z"), // 3/day
        ];
        let groups = group_by_category(&entries, &details, now);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category, "Games");
        assert_eq!(groups[0].app_count, 2);
        assert_eq!(groups[0].average_velocity, 6.0);
        assert_eq!(groups[0].trend_label, TrendLabel::Hot);
        assert_eq!(groups[1].trend_label, TrendLabel::Growing);
        assert_eq!(groups[2].category, "Music");
        assert_eq!(groups[2].average_velocity, 0.0);
        assert_eq!(groups[2].trend_label, TrendLabel::Emerging);
    }
}
