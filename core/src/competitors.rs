use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::engine::Engine;
use crate::error::RankResult;
use crate::keywords::normalize;
use crate::model::{App, AppId, Storefront};
use crate::rank::position_of;

/// Extra name-derived search terms beyond the full name.
const EXTRA_TERMS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorEntry {
    pub app: App,
    /// Number of searches this app appeared in.
    pub overlap_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorReport {
    pub target_app: App,
    pub rank_for_own_name: Option<u32>,
    pub searches_performed: Vec<String>,
    pub failed_searches: Vec<String>,
    pub competitors: Vec<CompetitorEntry>,
}

/// Full lower-cased name, then up to two of its longest words (over two
/// characters), longest first with earlier words winning ties.
pub fn competitor_terms(name: &str) -> Vec<String> {
    let full = normalize(name);
    let mut terms = vec![full.clone()];
    let mut words: Vec<&str> = full.split(' ').filter(|w| w.chars().count() > 2).collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    for w in words {
        if terms.len() > EXTRA_TERMS { break; }
        if !terms.iter().any(|t| t == w) {
            terms.push(w.to_string());
        }
    }
    terms
}

/// Counts, per app id, the number of result lists it appears in. Keeps
/// first-discovery order for tie-breaking.
#[derive(Debug, Default)]
pub struct OverlapTally {
    order: Vec<AppId>,
    counts: HashMap<AppId, u32>,
}

impl OverlapTally {
    pub fn add_search(&mut self, ids: &[AppId], exclude: AppId) {
        let mut seen = HashSet::new();
        for &id in ids {
            if id == exclude || !seen.insert(id) { continue; }
            let count = self.counts.entry(id).or_insert(0);
            if *count == 0 {
                self.order.push(id);
            }
            *count += 1;
        }
    }

    /// Ids by descending overlap; ties keep discovery order.
    pub fn top(&self, n: usize) -> Vec<(AppId, u32)> {
        let mut ranked: Vec<(AppId, u32)> = self.order.iter().map(|id| (*id, self.counts[id])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

impl Engine {
    /// Competitors by overlap across searches for the app's own name terms.
    /// Failed searches only narrow the pool.
    pub async fn app_competitors(&self, app_id: AppId, storefront: &Storefront) -> RankResult<CompetitorReport> {
        let start = Instant::now();
        let target_app = self.lookup_app(app_id, storefront).await?;
        let terms = competitor_terms(&target_app.name);

        let mut tally = OverlapTally::default();
        let mut rank_for_own_name = None;
        let mut failed_searches = Vec::new();
        for (i, term) in terms.iter().enumerate() {
            match self.paced_search(term, storefront, self.config.competitor_search_depth).await {
                Ok(ids) => {
                    if i == 0 {
                        rank_for_own_name = position_of(&ids, app_id);
                    }
                    tally.add_search(&ids, app_id);
                }
                Err(e) => {
                    tracing::warn!(app_id, term = %term, error = %e, "competitor search failed, skipping");
                    failed_searches.push(term.clone());
                }
            }
        }

        let top = tally.top(self.config.overlap_competitors);
        let ids: Vec<AppId> = top.iter().map(|(id, _)| *id).collect();
        let counts: HashMap<AppId, u32> = top.into_iter().collect();
        let competitors = match self.enrich(&ids, storefront).await {
            Ok(apps) => apps
                .into_iter()
                .map(|app| CompetitorEntry { overlap_count: counts[&app.id], app })
                .collect(),
            Err(e) => {
                tracing::warn!(app_id, error = %e, "competitor enrichment failed");
                Vec::new()
            }
        };

        tracing::info!(
            app_id,
            searches = terms.len(),
            failed = failed_searches.len(),
            competitors = competitors.len(),
            took_s = start.elapsed().as_secs_f64(),
            "competitor aggregation complete"
        );
        Ok(CompetitorReport {
            target_app,
            rank_for_own_name,
            searches_performed: terms,
            failed_searches,
            competitors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_use_longest_words() {
        assert_eq!(
            competitor_terms("Photo Editor Pro"),
            vec!["photo editor pro", "editor", "photo"]
        );
        assert_eq!(competitor_terms("Snapseed"), vec!["snapseed"]);
        assert_eq!(competitor_terms("Go Map"), vec!["go map", "map"]);
    }

    #[test]
    fn equal_length_words_keep_name_order() {
        assert_eq!(competitor_terms("Bird Fish Frog"), vec!["bird fish frog", "bird", "fish"]);
    }

    #[test]
    fn tally_counts_searches_not_occurrences() {
        let mut t = OverlapTally::default();
        t.add_search(&[1, 2, 3, 2], 1);
        t.add_search(&[3, 4], 1);
        t.add_search(&[4, 3, 5], 1);
        assert_eq!(t.top(10), vec![(3, 3), (4, 2), (2, 1), (5, 1)]);
        assert_eq!(t.top(2), vec![(3, 3), (4, 2)]);
    }
}
