//! Sequential analysis of a keyword list with checkpoint/resume.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::analyze::KeywordAnalysis;
use crate::engine::Engine;
use crate::error::RankResult;
use crate::model::Storefront;
use crate::persist::{load_json, save_json, RunStore};

const CHECKPOINT_EVERY: usize = 5;

/// One input row. Fields other than the ones named here are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchKeyword {
    pub search_term: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BatchKeyword {
    pub fn storefront(&self, fallback: &Storefront) -> Storefront {
        match self.country.as_deref() {
            Some(c) => c.parse().unwrap_or_else(|_| Storefront::from_country_name(c)),
            None => fallback.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub input: BatchKeyword,
    pub analysis: KeywordAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub keyword: String,
    pub input: BatchKeyword,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub generated: String,
    pub total_keywords: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub metadata: BatchMetadata,
    pub results: Vec<BatchResult>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Checkpoint {
    timestamp: String,
    successful: usize,
    failed: usize,
    results: Vec<BatchResult>,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

pub struct BatchRunner<'a> {
    engine: &'a Engine,
    storefront: Storefront,
    delay: Duration,
    checkpoint: Option<PathBuf>,
    store: Option<&'a RunStore>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a Engine, storefront: Storefront) -> Self {
        Self { engine, storefront, delay: Duration::from_secs(2), checkpoint: None, store: None }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    pub fn record_to(mut self, store: &'a RunStore) -> Self {
        self.store = Some(store);
        self
    }

    fn load_checkpoint(path: &Path) -> Vec<BatchResult> {
        if !path.exists() {
            return Vec::new();
        }
        match load_json::<Checkpoint>(path) {
            Ok(cp) => {
                tracing::info!(already_processed = cp.results.len(), "resuming from checkpoint");
                cp.results
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable checkpoint, starting over");
                Vec::new()
            }
        }
    }

    fn save_checkpoint(&self, results: &[BatchResult], successful: usize, failed: usize) {
        let Some(path) = &self.checkpoint else { return };
        let cp = Checkpoint { timestamp: now_rfc3339(), successful, failed, results: results.to_vec() };
        match save_json(path, &cp) {
            Ok(()) => tracing::debug!(successful, failed, "checkpoint saved"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "checkpoint write failed"),
        }
    }

    pub async fn run(&self, keywords: &[BatchKeyword]) -> RankResult<BatchReport> {
        let total = keywords.len();
        let mut results = self.checkpoint.as_deref().map(Self::load_checkpoint).unwrap_or_default();
        let processed: HashSet<String> = results.iter().map(|r| r.input.search_term.clone()).collect();
        let mut failures = Vec::new();
        let mut successful = 0usize;

        for (i, kw) in keywords.iter().enumerate() {
            let n = i + 1;
            if processed.contains(&kw.search_term) {
                tracing::debug!(n, total, keyword = %kw.search_term, "already processed, skipping");
                successful += 1;
                continue;
            }
            let storefront = kw.storefront(&self.storefront);
            match self.engine.analyze_keyword(&kw.search_term, &storefront).await {
                Ok(analysis) => {
                    tracing::info!(n, total, keyword = %kw.search_term, apps = analysis.apps.len(), competitiveness = analysis.competitiveness, "analyzed");
                    if let Some(store) = self.store {
                        if let Err(e) = store.record(&analysis) {
                            tracing::warn!(keyword = %kw.search_term, error = %e, "failed to record run");
                        }
                    }
                    results.push(BatchResult { input: kw.clone(), analysis });
                    successful += 1;
                }
                Err(e) => {
                    tracing::warn!(n, total, keyword = %kw.search_term, error = %e, "analysis failed");
                    failures.push(BatchFailure { keyword: kw.search_term.clone(), input: kw.clone(), error: e.to_string() });
                }
            }
            if n % CHECKPOINT_EVERY == 0 || n == total {
                self.save_checkpoint(&results, successful, failures.len());
            }
            if n < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        tracing::info!(successful, failed = failures.len(), "batch complete");
        Ok(BatchReport {
            metadata: BatchMetadata {
                generated: now_rfc3339(),
                total_keywords: total,
                successful,
                failed: failures.len(),
            },
            results,
            failed: failures,
        })
    }
}
