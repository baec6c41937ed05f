use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::engine::Engine;
use crate::error::{RankError, RankResult};
use crate::model::{App, AppId, Keyword, KeywordRanking, Storefront};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankLookup {
    pub keyword: String,
    pub total_results: usize,
    pub rank: Option<u32>,
    pub top_competitors: Vec<App>,
}

/// Outcome of one keyword in a bulk check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankCheck {
    Ranked(KeywordRanking),
    Failed { keyword: String, error: String },
}

impl RankCheck {
    pub fn keyword(&self) -> &str {
        match self {
            RankCheck::Ranked(r) => &r.keyword,
            RankCheck::Failed { keyword, .. } => keyword,
        }
    }

    pub fn rank(&self) -> Option<u32> {
        match self {
            RankCheck::Ranked(r) => r.rank,
            RankCheck::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub app: App,
    pub keywords_tested: usize,
    pub rankings: Vec<RankCheck>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    /// Rankings sorted best first, unranked keywords last.
    Minimal,
    /// Rankings in keyword generation order.
    #[default]
    Full,
}

/// 1-based position of `app_id` in `ids`.
pub fn position_of(ids: &[AppId], app_id: AppId) -> Option<u32> {
    ids.iter().position(|&id| id == app_id).map(|i| i as u32 + 1)
}

/// Best rank first, unranked last, ties by keyword.
pub fn sort_by_rank(rankings: &mut [RankCheck]) {
    rankings.sort_by(|a, b| {
        let ka = (a.rank().is_none(), a.rank().unwrap_or(u32::MAX));
        let kb = (b.rank().is_none(), b.rank().unwrap_or(u32::MAX));
        ka.cmp(&kb).then_with(|| a.keyword().cmp(b.keyword()))
    });
}

impl Engine {
    async fn keyword_ranking(
        &self,
        app_id: AppId,
        keyword: &str,
        storefront: &Storefront,
        pause: Duration,
    ) -> RankResult<(KeywordRanking, Vec<AppId>)> {
        let ids = self.paced_search_after(pause, keyword, storefront, self.config.search_depth).await?;
        let ranking = KeywordRanking {
            keyword: keyword.to_string(),
            rank: position_of(&ids, app_id),
            total_results: ids.len(),
        };
        Ok((ranking, ids))
    }

    /// Rank of one app for one keyword plus the top competitors for that keyword.
    pub async fn find_app_rank(&self, app_id: AppId, keyword: &str, storefront: &Storefront) -> RankResult<RankLookup> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(RankError::invalid("keyword must not be empty"));
        }
        let (ranking, ids) = self.keyword_ranking(app_id, keyword, storefront, Duration::ZERO).await?;
        let top: Vec<AppId> = ids.iter().copied().take(self.config.top_competitors).collect();
        let top_competitors = self.enrich(&top, storefront).await?;
        tracing::info!(app_id, keyword, rank = ?ranking.rank, total = ranking.total_results, "rank lookup complete");
        Ok(RankLookup {
            keyword: ranking.keyword,
            total_results: ranking.total_results,
            rank: ranking.rank,
            top_competitors,
        })
    }

    /// Generate keywords for an app and check its rank for each one, in order.
    /// A failed keyword is recorded and the loop moves on. Consecutive keywords
    /// are spaced by the bulk delay on top of the limiter interval.
    pub async fn check_app_rankings(
        &self,
        app_id: AppId,
        keyword_limit: Option<usize>,
        storefront: &Storefront,
        detail: Detail,
    ) -> RankResult<RankingReport> {
        let start = Instant::now();
        let app = self.lookup_app(app_id, storefront).await?;
        let keywords: Vec<Keyword> = self.generate_keywords(&app, keyword_limit).await;
        tracing::info!(app_id, keywords = keywords.len(), "checking rankings");

        let mut rankings = Vec::with_capacity(keywords.len());
        for (i, kw) in keywords.iter().enumerate() {
            let pause = if i > 0 { self.config.bulk_delay() } else { Duration::ZERO };
            match self.keyword_ranking(app_id, &kw.text, storefront, pause).await {
                Ok((ranking, _)) => rankings.push(RankCheck::Ranked(ranking)),
                Err(e) => {
                    tracing::warn!(app_id, keyword = %kw.text, error = %e, "rank check failed");
                    rankings.push(RankCheck::Failed { keyword: kw.text.clone(), error: e.to_string() });
                }
            }
        }
        if detail == Detail::Minimal {
            sort_by_rank(&mut rankings);
        }

        let ranked = rankings.iter().filter(|r| r.rank().is_some()).count();
        tracing::info!(app_id, tested = keywords.len(), ranked, took_s = start.elapsed().as_secs_f64(), "ranking check complete");
        Ok(RankingReport { app, keywords_tested: keywords.len(), rankings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(position_of(&[7, 8, 9], 7), Some(1));
        assert_eq!(position_of(&[7, 8, 9], 9), Some(3));
        assert_eq!(position_of(&[7, 8, 9], 1), None);
        assert_eq!(position_of(&[], 1), None);
    }

    #[test]
    fn minimal_sort_puts_unranked_last() {
        let ranked = |k: &str, r: Option<u32>| RankCheck::Ranked(KeywordRanking { keyword: k.into(), rank: r, total_results: 10 });
        let mut v = vec![
            ranked("zeta", None),
            RankCheck::Failed { keyword: "alpha".into(), error: "boom".into() },
            ranked("beta", Some(3)),
            ranked("gamma", Some(1)),
            ranked("delta", Some(3)),
        ];
        sort_by_rank(&mut v);
        let order: Vec<&str> = v.iter().map(|r| r.keyword()).collect();
        assert_eq!(order, vec!["gamma", "beta", "delta", "alpha", "zeta"]);
    }
}
