use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rankscope_core::{
    ComparisonReport, CompetitorReport, Detail, Engine, KeywordAnalysis, RankError, RankLookup, RankingReport,
    Storefront, TrendReport,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// JSON error body with a status derived from the engine error kind.
pub struct ApiError(RankError);

impl From<RankError> for ApiError {
    fn from(e: RankError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RankError::AppNotFound { .. } => StatusCode::NOT_FOUND,
            RankError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn storefront(raw: Option<&str>) -> Result<Storefront, ApiError> {
    match raw {
        Some(s) => Ok(s.parse::<Storefront>()?),
        None => Ok(Storefront::default()),
    }
}

#[derive(Deserialize)]
pub struct RankParams {
    pub app_id: u64,
    pub keyword: String,
    pub storefront: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeParams {
    pub keyword: String,
    pub storefront: Option<String>,
}

#[derive(Deserialize)]
pub struct AppParams {
    pub app_id: u64,
    pub storefront: Option<String>,
}

#[derive(Deserialize)]
pub struct RankingsParams {
    pub app_id: u64,
    pub limit: Option<usize>,
    pub storefront: Option<String>,
    #[serde(default)]
    pub minimal: bool,
}

#[derive(Deserialize)]
pub struct CompareBody {
    pub keywords: Vec<String>,
    pub storefront: Option<String>,
}

#[derive(Deserialize)]
pub struct TrendingParams {
    pub category: Option<String>,
    pub storefront: Option<String>,
    #[serde(default = "default_chart_limit")]
    pub limit: usize,
}
fn default_chart_limit() -> usize { 50 }

pub fn build_app(engine: Arc<Engine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rank", get(rank_handler))
        .route("/analyze", get(analyze_handler))
        .route("/competitors", get(competitors_handler))
        .route("/rankings", get(rankings_handler))
        .route("/compare", post(compare_handler))
        .route("/trending", get(trending_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn rank_handler(State(state): State<AppState>, Query(p): Query<RankParams>) -> ApiResult<RankLookup> {
    let sf = storefront(p.storefront.as_deref())?;
    Ok(Json(state.engine.find_app_rank(p.app_id, &p.keyword, &sf).await?))
}

pub async fn analyze_handler(State(state): State<AppState>, Query(p): Query<AnalyzeParams>) -> ApiResult<KeywordAnalysis> {
    let sf = storefront(p.storefront.as_deref())?;
    Ok(Json(state.engine.analyze_keyword(&p.keyword, &sf).await?))
}

pub async fn competitors_handler(State(state): State<AppState>, Query(p): Query<AppParams>) -> ApiResult<CompetitorReport> {
    let sf = storefront(p.storefront.as_deref())?;
    Ok(Json(state.engine.app_competitors(p.app_id, &sf).await?))
}

pub async fn rankings_handler(State(state): State<AppState>, Query(p): Query<RankingsParams>) -> ApiResult<RankingReport> {
    let sf = storefront(p.storefront.as_deref())?;
    let detail = if p.minimal { Detail::Minimal } else { Detail::Full };
    Ok(Json(state.engine.check_app_rankings(p.app_id, p.limit, &sf, detail).await?))
}

pub async fn compare_handler(State(state): State<AppState>, Json(body): Json<CompareBody>) -> ApiResult<ComparisonReport> {
    let sf = storefront(body.storefront.as_deref())?;
    Ok(Json(state.engine.compare_keywords(&body.keywords, &sf).await?))
}

pub async fn trending_handler(State(state): State<AppState>, Query(p): Query<TrendingParams>) -> ApiResult<TrendReport> {
    let sf = storefront(p.storefront.as_deref())?;
    Ok(Json(state.engine.discover_trending(p.category.as_deref(), &sf, p.limit).await?))
}
