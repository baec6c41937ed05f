pub mod analyze;
pub mod batch;
pub mod collab;
pub mod competitors;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod limiter;
pub mod matching;
pub mod model;
pub mod persist;
pub mod rank;
pub mod scoring;
pub mod trending;

#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use analyze::{ComparisonReport, KeywordAnalysis, KeywordComparison};
pub use collab::{AppDetails, ChartFeed, KeywordSource, RankedSearch};
pub use competitors::{CompetitorEntry, CompetitorReport};
pub use config::{EngineConfig, ANALYSIS_DEPTH, MAX_COMPARE_KEYWORDS};
pub use engine::Engine;
pub use error::{RankError, RankResult};
pub use limiter::RateLimiter;
pub use model::{App, AppId, ChartEntry, ChartKind, Keyword, KeywordOrigin, KeywordRanking, KeywordSuggestions, Storefront};
pub use rank::{Detail, RankCheck, RankLookup, RankingReport};
pub use scoring::{AnalyzedApp, SearchSummary, TrendLabel, TrendSignal};
pub use trending::{TrendBucket, TrendReport};
