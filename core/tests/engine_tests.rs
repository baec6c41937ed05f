use rankscope_core::stub::{self, StubMarket, StubSuggestions};
use rankscope_core::{App, ChartEntry, ChartKind, Detail, KeywordComparison, KeywordOrigin, KeywordSuggestions, RankCheck, RankError, Storefront, TrendLabel, TrendSignal};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

fn us() -> Storefront { Storefront::default() }

fn days_ago(days: i64) -> Option<String> {
    (OffsetDateTime::now_utc() - Duration::days(days)).format(&Rfc3339).ok()
}

fn dated(id: u64, name: &str, age_days: i64, rating_count: u64) -> App {
    App {
        release_date: days_ago(age_days),
        current_version_release_date: days_ago(10),
        rating_count,
        ..stub::app(id, name)
    }
}

#[tokio::test]
async fn find_app_rank_reports_position_and_top_five() {
    let ids: Vec<u64> = (1..=8).collect();
    let mut market = StubMarket::new().with_results("photo editor", &ids);
    for id in &ids {
        market = market.with_app(stub::app(*id, &format!("App {id}")));
    }
    let market = Arc::new(market);
    let engine = stub::engine(market.clone());

    let r = engine.find_app_rank(7, "photo editor", &us()).await.unwrap();
    assert_eq!(r.rank, Some(7));
    assert_eq!(r.total_results, 8);
    let top: Vec<u64> = r.top_competitors.iter().map(|a| a.id).collect();
    assert_eq!(top, vec![1, 2, 3, 4, 5]);
    assert_eq!(market.lookups(), vec![vec![1, 2, 3, 4, 5]]);
}

#[tokio::test]
async fn find_app_rank_with_no_results() {
    let market = Arc::new(StubMarket::new());
    let engine = stub::engine(market.clone());
    let r = engine.find_app_rank(7, "nothing", &us()).await.unwrap();
    assert_eq!(r.rank, None);
    assert_eq!(r.total_results, 0);
    assert!(r.top_competitors.is_empty());
    assert!(market.lookups().is_empty());
}

#[tokio::test]
async fn find_app_rank_fails_as_a_unit() {
    let market = Arc::new(StubMarket::new().failing("photo"));
    let engine = stub::engine(market);
    let err = engine.find_app_rank(7, "photo", &us()).await.unwrap_err();
    assert!(matches!(err, RankError::Transport(_)));
}

#[tokio::test]
async fn rank_never_exceeds_search_depth() {
    let ids: Vec<u64> = (1..=250).collect();
    let market = Arc::new(StubMarket::new().with_results("game", &ids));
    let engine = stub::engine(market);
    let r = engine.find_app_rank(240, "game", &us()).await.unwrap();
    assert_eq!(r.total_results, 200);
    assert_eq!(r.rank, None);
    let r = engine.find_app_rank(200, "game", &us()).await.unwrap();
    assert_eq!(r.rank, Some(200));
}

#[tokio::test]
async fn analyze_keyword_scores_top_twenty() {
    let ids: Vec<u64> = (1..=25).collect();
    let mut market = StubMarket::new().with_results("photo editor", &ids);
    for id in &ids {
        let name = if *id == 1 { "Photo Editor Pro".to_string() } else { format!("Pic Edit Studio {id}") };
        market = market.with_app(dated(*id, &name, 365, 3650));
    }
    let engine = stub::engine(Arc::new(market));

    let a = engine.analyze_keyword("photo editor", &us()).await.unwrap();
    assert_eq!(a.apps.len(), 20);
    let ranks: Vec<u32> = a.apps.iter().map(|a| a.rank).collect();
    assert_eq!(ranks, (1..=20).collect::<Vec<u32>>());
    assert_eq!(a.apps[0].title_match_score, 5);
    assert_eq!(a.apps[1].title_match_score, 0);
    assert_eq!(a.apps[0].age_days, 365);
    assert_eq!(a.apps[0].ratings_per_day, 10.0);
    assert_eq!(a.summary.newest_count, 6);
    assert_eq!(a.summary.established_count, 14);
    assert!((0.0..=100.0).contains(&a.competitiveness));
    assert_eq!(a.competitiveness, a.summary.competitiveness_v1);
}

#[tokio::test]
async fn analyze_keyword_with_no_results_is_zeroed() {
    let engine = stub::engine(Arc::new(StubMarket::new()));
    let a = engine.analyze_keyword("zzzz", &us()).await.unwrap();
    assert!(a.apps.is_empty());
    assert_eq!(a.competitiveness, 0.0);
    assert_eq!(a.summary.velocity_ratio, 0.0);
    assert_eq!(a.trend_signal, TrendSignal::EstablishedDominated);
}

#[tokio::test]
async fn analyze_keyword_heating_up() {
    // two young fast apps, four old slow ones: newest bucket = 2
    let market = StubMarket::new()
        .with_results("notes", &[1, 2, 3, 4, 5, 6])
        .with_app(dated(1, "Notes A", 10, 1000))
        .with_app(dated(2, "Notes B", 20, 2000))
        .with_app(dated(3, "Notes C", 1000, 1000))
        .with_app(dated(4, "Notes D", 1000, 1000))
        .with_app(dated(5, "Notes E", 1000, 1000))
        .with_app(dated(6, "Notes F", 1000, 1000));
    let engine = stub::engine(Arc::new(market));
    let a = engine.analyze_keyword("notes", &us()).await.unwrap();
    assert_eq!(a.summary.newest_count, 2);
    assert_eq!(a.summary.velocity_ratio, 100.0);
    assert_eq!(a.trend_signal, TrendSignal::HeatingUp);
}

#[tokio::test]
async fn competitors_survive_failed_name_search() {
    let market = StubMarket::new()
        .with_app(stub::app(1, "Photo Editor Pro"))
        .with_app(stub::app(2, "Other"))
        .failing("photo editor pro")
        .with_results("editor", &[2, 1])
        .with_results("photo", &[3]);
    let market = Arc::new(market);
    let engine = stub::engine(market.clone());

    let r = engine.app_competitors(1, &us()).await.unwrap();
    assert_eq!(r.searches_performed, vec!["photo editor pro", "editor", "photo"]);
    assert_eq!(r.failed_searches, vec!["photo editor pro"]);
    assert_eq!(r.rank_for_own_name, None);
    // id 3 has no detail record and is dropped
    assert_eq!(r.competitors.len(), 1);
    assert_eq!(r.competitors[0].app.id, 2);
    assert_eq!(r.competitors[0].overlap_count, 1);
}

#[tokio::test]
async fn competitors_sorted_by_overlap() {
    let market = StubMarket::new()
        .with_app(stub::app(1, "Photo Editor Pro"))
        .with_app(stub::app(10, "A"))
        .with_app(stub::app(11, "B"))
        .with_app(stub::app(12, "C"))
        .with_results("photo editor pro", &[10, 1, 11])
        .with_results("editor", &[11, 12, 1])
        .with_results("photo", &[11, 10]);
    let engine = stub::engine(Arc::new(market));

    let r = engine.app_competitors(1, &us()).await.unwrap();
    assert_eq!(r.rank_for_own_name, Some(2));
    let got: Vec<(u64, u32)> = r.competitors.iter().map(|c| (c.app.id, c.overlap_count)).collect();
    assert_eq!(got, vec![(11, 3), (10, 2), (12, 1)]);
}

#[tokio::test]
async fn competitors_for_unknown_app() {
    let engine = stub::engine(Arc::new(StubMarket::new()));
    let err = engine.app_competitors(99, &us()).await.unwrap_err();
    assert!(matches!(err, RankError::AppNotFound { app_id: 99 }));
}

#[tokio::test]
async fn bulk_check_isolates_failures() {
    let app = App { genre: None, developer: "Zz".into(), ..stub::app(1, "Photo Editor") };
    let market = StubMarket::new()
        .with_app(app)
        .with_results("photo", &[5, 1])
        .failing("editor")
        .with_results("photo editor", &[1]);
    let market = Arc::new(market);
    let engine = stub::engine(market.clone());

    let r = engine.check_app_rankings(1, None, &us(), Detail::Full).await.unwrap();
    assert_eq!(r.keywords_tested, 4);
    let keywords: Vec<&str> = r.rankings.iter().map(|c| c.keyword()).collect();
    assert_eq!(keywords, vec!["photo", "editor", "photo editor", "editor photo"]);
    assert_eq!(r.rankings[0].rank(), Some(2));
    assert!(matches!(r.rankings[1], RankCheck::Failed { .. }));
    assert_eq!(r.rankings[2].rank(), Some(1));
    assert_eq!(r.rankings[3].rank(), None);
    assert_eq!(market.searches().len(), 4);

    let r = engine.check_app_rankings(1, Some(2), &us(), Detail::Minimal).await.unwrap();
    assert_eq!(r.keywords_tested, 2);
    let keywords: Vec<&str> = r.rankings.iter().map(|c| c.keyword()).collect();
    assert_eq!(keywords, vec!["photo", "editor"]);
}

#[tokio::test]
async fn compare_rejects_too_many_keywords_before_searching() {
    let market = Arc::new(StubMarket::new());
    let engine = stub::engine(market.clone());
    let keywords: Vec<String> = (0..11).map(|i| format!("kw{i}")).collect();
    let err = engine.compare_keywords(&keywords, &us()).await.unwrap_err();
    assert!(matches!(err, RankError::InvalidInput(_)));
    assert!(market.searches().is_empty());

    let err = engine.compare_keywords(&[], &us()).await.unwrap_err();
    assert!(matches!(err, RankError::InvalidInput(_)));
}

#[tokio::test]
async fn compare_recommends_least_competitive() {
    let market = StubMarket::new()
        .with_results("busy", &[1, 2])
        .with_app(dated(1, "Busy App", 365, 36500))
        .with_app(dated(2, "Busy Thing", 100, 10000))
        .failing("broken");
    let engine = stub::engine(Arc::new(market));
    let keywords = vec!["busy".to_string(), "broken".to_string(), "quiet".to_string()];
    let r = engine.compare_keywords(&keywords, &us()).await.unwrap();
    assert_eq!(r.comparisons.len(), 3);
    assert!(matches!(r.comparisons[1], KeywordComparison::Failed { .. }));
    assert_eq!(r.recommendation.as_deref(), Some("quiet"));
}

#[tokio::test]
async fn trending_groups_new_charts() {
    let entry = |id: u64, cat: &str| ChartEntry { id, name: format!("n{id}"), developer: "d".into(), price: 0.0, category: Some(cat.into()) };
    let market = StubMarket::new()
        .with_chart(ChartKind::NewFree, vec![entry(1, "Games"), entry(2, "Music")])
        .with_chart(ChartKind::NewPaid, vec![entry(3, "Games"), entry(1, "Games")])
        .with_app(App { genre: Some("Games".into()), ..dated(1, "n1", 10, 100) })
        .with_app(App { genre: Some("Games".into()), ..dated(3, "n3", 10, 20) });
    let engine = stub::engine(Arc::new(market));
    let r = engine.discover_trending(None, &us(), 10).await.unwrap();
    assert_eq!(r.groups.len(), 2);
    let games = &r.groups[0];
    assert_eq!(games.category, "Games");
    assert_eq!(games.app_count, 2);
    assert_eq!(games.average_velocity, 6.0);
    assert_eq!(games.trend_label, TrendLabel::Hot);
    let music = &r.groups[1];
    assert_eq!(music.average_velocity, 0.0);
    assert_eq!(music.trend_label, TrendLabel::Emerging);
}

#[tokio::test]
async fn suggestions_merge_and_absence_is_harmless() {
    let app = App { genre: None, developer: "Zz".into(), ..stub::app(1, "Photo") };
    let market = Arc::new(StubMarket::new().with_app(app).with_results("photo", &[1]));

    let silent = Arc::new(StubSuggestions::new(None));
    let engine = stub::engine(market.clone()).with_keyword_source(silent.clone());
    let r = engine.check_app_rankings(1, None, &us(), Detail::Full).await.unwrap();
    assert_eq!(r.keywords_tested, 1);
    assert_eq!(silent.calls(), 1);

    let helpful = Arc::new(StubSuggestions::new(Some(KeywordSuggestions {
        single_words: vec!["Camera".into(), "photo".into()],
        phrases: vec!["Photo Filters".into()],
    })));
    let engine = stub::engine(market).with_keyword_source(helpful);
    let r = engine.check_app_rankings(1, None, &us(), Detail::Full).await.unwrap();
    let keywords: Vec<&str> = r.rankings.iter().map(|c| c.keyword()).collect();
    assert_eq!(keywords, vec!["photo", "camera", "photo filters"]);
}

#[tokio::test]
async fn generator_is_deterministic_without_suggestions() {
    let app = App { genre: Some("Photo & Video".into()), ..stub::app(1, "Snap Edit Studio") };
    let g = rankscope_core::keywords::KeywordGenerator::default();
    let a = g.generate(&app, None, None).await;
    let b = g.generate(&app, None, None).await;
    assert_eq!(a, b);
    assert!(a.iter().any(|k| k.origin == KeywordOrigin::GenreCrossTerm));
}
