//! Contracts for the external services the engine talks to.
//!
//! Implementations decode their wire formats into the typed records of
//! [`crate::model`] before anything reaches the engine.

use async_trait::async_trait;

use crate::error::RankResult;
use crate::model::{App, AppId, ChartEntry, ChartKind, KeywordSuggestions, Storefront};

/// Search backend that returns results in true display order.
#[async_trait]
pub trait RankedSearch: Send + Sync {
    /// Ordered app ids for `term`; index 0 is rank 1. At most `depth` ids.
    async fn ranked_search(&self, term: &str, storefront: &Storefront, depth: usize) -> RankResult<Vec<AppId>>;
}

#[async_trait]
pub trait AppDetails: Send + Sync {
    /// Batch lookup. Ids without a match are omitted and the order of the
    /// returned records is unspecified.
    async fn lookup(&self, ids: &[AppId], storefront: &Storefront) -> RankResult<Vec<App>>;
}

#[async_trait]
pub trait ChartFeed: Send + Sync {
    async fn chart_entries(
        &self,
        kind: ChartKind,
        storefront: &Storefront,
        limit: usize,
        category: Option<&str>,
    ) -> RankResult<Vec<ChartEntry>>;
}

/// Optional source of extra keyword ideas. Best effort: `None` means the
/// source had nothing to offer, for whatever reason.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn suggest(&self, app_name: &str, app_description: &str) -> Option<KeywordSuggestions>;
}
