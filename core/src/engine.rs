use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::collab::{AppDetails, ChartFeed, KeywordSource, RankedSearch};
use crate::config::EngineConfig;
use crate::error::{RankError, RankResult};
use crate::keywords::KeywordGenerator;
use crate::limiter::RateLimiter;
use crate::model::{App, AppId, Keyword, Storefront};

/// Wires the collaborators, the shared rate limiter and the configuration
/// together. Each exposed operation lives in its own module as an `impl Engine` block.
pub struct Engine {
    pub(crate) search: Arc<dyn RankedSearch>,
    pub(crate) details: Arc<dyn AppDetails>,
    pub(crate) charts: Arc<dyn ChartFeed>,
    pub(crate) suggestions: Option<Arc<dyn KeywordSource>>,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) keywords: KeywordGenerator,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(
        search: Arc<dyn RankedSearch>,
        details: Arc<dyn AppDetails>,
        charts: Arc<dyn ChartFeed>,
        config: EngineConfig,
    ) -> Self {
        Self {
            search,
            details,
            charts,
            suggestions: None,
            limiter: Arc::new(RateLimiter::new(config.interval())),
            keywords: KeywordGenerator::new(config.suggested_words, config.suggested_phrases),
            config,
        }
    }

    /// Share a limiter with other engines hitting the same backend.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_keyword_source(mut self, source: Arc<dyn KeywordSource>) -> Self {
        self.suggestions = Some(source);
        self
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// One ranked search behind the rate limiter, cut to `depth`.
    pub(crate) async fn paced_search(&self, term: &str, storefront: &Storefront, depth: usize) -> RankResult<Vec<AppId>> {
        self.paced_search_after(Duration::ZERO, term, storefront, depth).await
    }

    /// Ranked search admitted only once `pause` has also passed on top of the limiter interval.
    pub(crate) async fn paced_search_after(
        &self,
        pause: Duration,
        term: &str,
        storefront: &Storefront,
        depth: usize,
    ) -> RankResult<Vec<AppId>> {
        self.limiter.wait_with_pause(pause).await;
        tracing::debug!(term, %storefront, depth, pause_ms = pause.as_millis() as u64, "ranked search");
        let mut ids = self.search.ranked_search(term, storefront, depth).await?;
        ids.truncate(depth);
        Ok(ids)
    }

    /// Detail records for `ids`, returned in the order of `ids`. Unknown ids are dropped.
    pub(crate) async fn enrich(&self, ids: &[AppId], storefront: &Storefront) -> RankResult<Vec<App>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.details.lookup(ids, storefront).await?;
        let mut by_id: HashMap<AppId, App> = found.into_iter().map(|a| (a.id, a)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Candidate keywords for `app`, including suggestions when a source is configured.
    pub async fn generate_keywords(&self, app: &App, limit: Option<usize>) -> Vec<Keyword> {
        self.keywords.generate(app, limit, self.suggestions.as_deref()).await
    }

    pub async fn lookup_app(&self, app_id: AppId, storefront: &Storefront) -> RankResult<App> {
        self.enrich(&[app_id], storefront)
            .await?
            .into_iter()
            .next()
            .ok_or(RankError::AppNotFound { app_id })
    }
}
