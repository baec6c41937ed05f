use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Depth of every competitiveness analysis. Fixed, not part of [`EngineConfig`].
pub const ANALYSIS_DEPTH: usize = 20;
/// Largest keyword list `compare_keywords` accepts.
pub const MAX_COMPARE_KEYWORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum spacing between ranked-search calls.
    pub interval_ms: u64,
    /// Extra pause between keywords in a bulk rank check.
    pub bulk_delay_ms: u64,
    pub search_depth: usize,
    pub competitor_search_depth: usize,
    pub top_competitors: usize,
    pub overlap_competitors: usize,
    pub suggested_words: usize,
    pub suggested_phrases: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            bulk_delay_ms: 500,
            search_depth: 200,
            competitor_search_depth: 30,
            top_competitors: 5,
            overlap_competitors: 10,
            suggested_words: 10,
            suggested_phrases: 10,
        }
    }
}

impl EngineConfig {
    /// Defaults, with pacing overridable via RANKSCOPE_INTERVAL_MS and RANKSCOPE_BULK_DELAY_MS.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(ms) = env_ms("RANKSCOPE_INTERVAL_MS") { cfg.interval_ms = ms; }
        if let Some(ms) = env_ms("RANKSCOPE_BULK_DELAY_MS") { cfg.bulk_delay_ms = ms; }
        cfg
    }

    pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }
    pub fn bulk_delay(&self) -> Duration { Duration::from_millis(self.bulk_delay_ms) }
}

fn env_ms(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric pacing override");
            None
        }
    }
}
