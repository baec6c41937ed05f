use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::debug;

use rankscope_core::{App, AppDetails, AppId, ChartEntry, ChartFeed, ChartKind, RankError, RankResult, RankedSearch, Storefront};

use crate::api_types::{ApiChartResponse, ApiSearchResponse};

const DEFAULT_API_BASE: &str = "https://itunes.apple.com";
/// Most results the search endpoint will return for one query.
const MAX_SEARCH_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct ItunesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 15,
            user_agent: concat!("rankscope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Marketplace client implementing the search, lookup and chart contracts.
#[derive(Debug, Clone)]
pub struct ItunesClient {
    http: Client,
    base: Url,
}

impl ItunesClient {
    pub fn new(config: ItunesConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base = Url::parse(&config.base_url)?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> RankResult<Url> {
        self.base.join(path).map_err(|e| RankError::invalid(format!("bad endpoint {path}: {e}")))
    }

    async fn get_text(&self, url: Url) -> RankResult<String> {
        let start = Instant::now();
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RankError::Transport(format!("request to {url} failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RankError::Transport(format!("{url} returned {status}")));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| RankError::Transport(format!("reading body from {url}: {e}")))?;
        debug!(%url, bytes = body.len(), took_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(body)
    }
}

pub fn parse_search_ids(body: &str) -> RankResult<Vec<AppId>> {
    let resp: ApiSearchResponse = serde_json::from_str(body)?;
    Ok(resp.results.into_iter().map(|r| r.trackId).collect())
}

pub fn parse_lookup(body: &str) -> RankResult<Vec<App>> {
    let resp: ApiSearchResponse = serde_json::from_str(body)?;
    Ok(resp.results.into_iter().map(App::from).collect())
}

pub fn parse_chart(body: &str) -> RankResult<Vec<ChartEntry>> {
    let resp: ApiChartResponse = serde_json::from_str(body)?;
    let entries = resp.feed.entry.map(|e| e.into_vec()).unwrap_or_default();
    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        let id = e
            .id
            .attributes
            .id
            .parse()
            .map_err(|_| RankError::Decode(format!("non-numeric chart id {:?}", e.id.attributes.id)))?;
        out.push(ChartEntry {
            id,
            name: e.name.label,
            developer: e.artist.map(|a| a.label).unwrap_or_default(),
            price: e
                .price
                .and_then(|p| p.attributes)
                .and_then(|a| a.amount.parse().ok())
                .unwrap_or(0.0),
            category: e.category.and_then(|c| c.attributes).map(|a| a.label).filter(|l| !l.is_empty()),
        });
    }
    Ok(out)
}

fn chart_path(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::NewFree => "newfreeapplications",
        ChartKind::NewPaid => "newpaidapplications",
    }
}

#[async_trait]
impl RankedSearch for ItunesClient {
    async fn ranked_search(&self, term: &str, storefront: &Storefront, depth: usize) -> RankResult<Vec<AppId>> {
        let mut url = self.endpoint("/search")?;
        url.query_pairs_mut()
            .append_pair("term", term)
            .append_pair("country", storefront.as_str())
            .append_pair("entity", "software")
            .append_pair("limit", &depth.min(MAX_SEARCH_LIMIT).to_string());
        let body = self.get_text(url).await?;
        parse_search_ids(&body)
    }
}

#[async_trait]
impl AppDetails for ItunesClient {
    async fn lookup(&self, ids: &[AppId], storefront: &Storefront) -> RankResult<Vec<App>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        let mut url = self.endpoint("/lookup")?;
        url.query_pairs_mut()
            .append_pair("id", &joined)
            .append_pair("country", storefront.as_str());
        let body = self.get_text(url).await?;
        parse_lookup(&body)
    }
}

#[async_trait]
impl ChartFeed for ItunesClient {
    async fn chart_entries(&self, kind: ChartKind, storefront: &Storefront, limit: usize, category: Option<&str>) -> RankResult<Vec<ChartEntry>> {
        let mut path = format!("/{}/rss/{}/limit={}", storefront.as_str(), chart_path(kind), limit.max(1));
        if let Some(genre) = category.map(str::trim).filter(|c| !c.is_empty()) {
            path.push_str(&format!("/genre={genre}"));
        }
        path.push_str("/json");
        let body = self.get_text(self.endpoint(&path)?).await?;
        parse_chart(&body)
    }
}
