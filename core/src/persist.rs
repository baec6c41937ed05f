use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::analyze::KeywordAnalysis;
use crate::error::RankResult;
use crate::model::AppId;
use crate::scoring::{SearchSummary, TrendSignal};

/// One recorded keyword analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRun {
    pub keyword: String,
    pub storefront: String,
    pub recorded_at: String,
    pub competitiveness: f64,
    pub trend: TrendSignal,
    pub summary: SearchSummary,
    pub app_ids: Vec<AppId>,
}

/// History of keyword analyses, keyed by keyword then time of recording.
pub struct RunStore {
    db: sled::Db,
}

fn run_key(keyword: &str, at: OffsetDateTime) -> Vec<u8> {
    let mut key = keyword.as_bytes().to_vec();
    key.push(0);
    key.extend_from_slice(&(at.unix_timestamp_nanos().max(0) as u128).to_be_bytes());
    key
}

fn keyword_prefix(keyword: &str) -> Vec<u8> {
    let mut prefix = keyword.as_bytes().to_vec();
    prefix.push(0);
    prefix
}

impl RunStore {
    pub fn open<P: AsRef<Path>>(path: P) -> RankResult<Self> {
        fs::create_dir_all(path.as_ref())?;
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub fn record(&self, analysis: &KeywordAnalysis) -> RankResult<SearchRun> {
        self.record_at(analysis, OffsetDateTime::now_utc())
    }

    pub fn record_at(&self, analysis: &KeywordAnalysis, at: OffsetDateTime) -> RankResult<SearchRun> {
        let run = SearchRun {
            keyword: analysis.keyword.clone(),
            storefront: analysis.storefront.to_string(),
            recorded_at: at.format(&Rfc3339).unwrap_or_default(),
            competitiveness: analysis.competitiveness,
            trend: analysis.trend_signal,
            summary: analysis.summary.clone(),
            app_ids: analysis.app_ids(),
        };
        let bytes = bincode::serialize(&run)?;
        self.db.insert(run_key(&run.keyword, at), bytes)?;
        self.db.flush()?;
        tracing::debug!(keyword = %run.keyword, "search run recorded");
        Ok(run)
    }

    /// All runs for `keyword`, oldest first.
    pub fn runs_for(&self, keyword: &str) -> RankResult<Vec<SearchRun>> {
        let mut runs = Vec::new();
        for item in self.db.scan_prefix(keyword_prefix(keyword)) {
            let (_, value) = item?;
            runs.push(bincode::deserialize(&value)?);
        }
        Ok(runs)
    }
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> RankResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(value)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> RankResult<T> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(serde_json::from_str(&buf)?)
}
