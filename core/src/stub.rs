//! In-memory collaborators for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

use crate::collab::{AppDetails, ChartFeed, KeywordSource, RankedSearch};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{RankError, RankResult};
use crate::model::{App, AppId, ChartEntry, ChartKind, KeywordSuggestions, Storefront};

/// Minimal app record; adjust fields with struct update syntax.
pub fn app(id: AppId, name: &str) -> App {
    App {
        id,
        name: name.to_string(),
        developer: "Example Labs".to_string(),
        rating: Some(4.5),
        rating_count: 100,
        release_date: None,
        current_version_release_date: None,
        genre: None,
        bundle_id: format!("com.example.{id}"),
        price: 0.0,
        description: String::new(),
        version: Some("1.0".to_string()),
        content_rating: Some("4+".to_string()),
    }
}

/// A marketplace held in memory. Unknown search terms return no results.
#[derive(Default)]
pub struct StubMarket {
    apps: Mutex<HashMap<AppId, App>>,
    results: Mutex<HashMap<String, Vec<AppId>>>,
    failing_terms: Mutex<HashSet<String>>,
    charts: Mutex<HashMap<ChartKind, Vec<ChartEntry>>>,
    search_log: Mutex<Vec<(String, Instant)>>,
    lookup_log: Mutex<Vec<Vec<AppId>>>,
}

impl StubMarket {
    pub fn new() -> Self { Self::default() }

    pub fn with_app(self, app: App) -> Self {
        self.apps.lock().insert(app.id, app);
        self
    }

    pub fn with_results(self, term: &str, ids: &[AppId]) -> Self {
        self.results.lock().insert(term.to_string(), ids.to_vec());
        self
    }

    pub fn failing(self, term: &str) -> Self {
        self.failing_terms.lock().insert(term.to_string());
        self
    }

    pub fn with_chart(self, kind: ChartKind, entries: Vec<ChartEntry>) -> Self {
        self.charts.lock().insert(kind, entries);
        self
    }

    /// Terms searched so far, in call order.
    pub fn searches(&self) -> Vec<String> {
        self.search_log.lock().iter().map(|(term, _)| term.clone()).collect()
    }

    /// When each search reached the market, in call order.
    pub fn search_times(&self) -> Vec<Instant> {
        self.search_log.lock().iter().map(|(_, at)| *at).collect()
    }

    pub fn lookups(&self) -> Vec<Vec<AppId>> { self.lookup_log.lock().clone() }
}

#[async_trait]
impl RankedSearch for StubMarket {
    async fn ranked_search(&self, term: &str, _storefront: &Storefront, depth: usize) -> RankResult<Vec<AppId>> {
        self.search_log.lock().push((term.to_string(), Instant::now()));
        if self.failing_terms.lock().contains(term) {
            return Err(RankError::Transport(format!("simulated failure for {term:?}")));
        }
        let mut ids = self.results.lock().get(term).cloned().unwrap_or_default();
        ids.truncate(depth);
        Ok(ids)
    }
}

#[async_trait]
impl AppDetails for StubMarket {
    async fn lookup(&self, ids: &[AppId], _storefront: &Storefront) -> RankResult<Vec<App>> {
        self.lookup_log.lock().push(ids.to_vec());
        let apps = self.apps.lock();
        // reversed so callers cannot rely on input order
        Ok(ids.iter().rev().filter_map(|id| apps.get(id).cloned()).collect())
    }
}

#[async_trait]
impl ChartFeed for StubMarket {
    async fn chart_entries(&self, kind: ChartKind, _storefront: &Storefront, limit: usize, _category: Option<&str>) -> RankResult<Vec<ChartEntry>> {
        let mut entries = self.charts.lock().get(&kind).cloned().unwrap_or_default();
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Suggestion source returning a fixed answer and counting calls.
#[derive(Default)]
pub struct StubSuggestions {
    pub answer: Option<KeywordSuggestions>,
    calls: AtomicUsize,
}

impl StubSuggestions {
    pub fn new(answer: Option<KeywordSuggestions>) -> Self {
        Self { answer, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl KeywordSource for StubSuggestions {
    async fn suggest(&self, _app_name: &str, _app_description: &str) -> Option<KeywordSuggestions> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Engine over `market` with pacing turned off.
pub fn engine(market: Arc<StubMarket>) -> Engine {
    paced_engine(market, 0, 0)
}

/// Engine over `market` with the given limiter interval and bulk delay.
pub fn paced_engine(market: Arc<StubMarket>, interval_ms: u64, bulk_delay_ms: u64) -> Engine {
    let config = EngineConfig { interval_ms, bulk_delay_ms, ..EngineConfig::default() };
    Engine::new(market.clone(), market.clone(), market, config)
}
