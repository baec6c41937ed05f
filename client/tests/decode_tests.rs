use rankscope_client::itunes::{parse_chart, parse_lookup, parse_search_ids};
use rankscope_core::RankError;

const SEARCH: &str = r#"{
  "resultCount": 3,
  "results": [
    {"trackId": 333, "trackName": "Third", "bundleId": "c"},
    {"trackId": 111, "trackName": "First", "bundleId": "a"},
    {"trackId": 222, "trackName": "Second", "bundleId": "b"}
  ]
}"#;

const LOOKUP: &str = r#"{
  "resultCount": 1,
  "results": [{
    "trackId": 389801252,
    "trackName": "Instagram",
    "artistName": "Instagram, Inc.",
    "sellerName": "Instagram, Inc.",
    "averageUserRating": 4.68,
    "userRatingCount": 26000000,
    "releaseDate": "2010-10-06T07:00:00Z",
    "currentVersionReleaseDate": "2024-03-01T15:02:11Z",
    "primaryGenreName": "Photo & Video",
    "bundleId": "com.burbn.instagram",
    "price": 0.00,
    "description": "Bringing you closer to the people and things you love.",
    "version": "321.0",
    "contentAdvisoryRating": "12+"
  }]
}"#;

const CHART: &str = r#"{
  "feed": {
    "entry": [
      {
        "im:name": {"label": "Fresh Game"},
        "im:artist": {"label": "Indie Dev"},
        "im:price": {"label": "Get", "attributes": {"amount": "0.00000", "currency": "USD"}},
        "id": {"label": "https://apps.apple.com/us/app/id42", "attributes": {"im:id": "42", "im:bundleId": "x"}},
        "category": {"attributes": {"im:id": "6014", "term": "Games", "label": "Games"}}
      },
      {
        "im:name": {"label": "Paid Tool"},
        "im:price": {"label": "$2.99", "attributes": {"amount": "2.99000", "currency": "USD"}},
        "id": {"label": "https://apps.apple.com/us/app/id43", "attributes": {"im:id": "43"}}
      }
    ]
  }
}"#;

#[test]
fn search_ids_keep_response_order() {
    assert_eq!(parse_search_ids(SEARCH).unwrap(), vec![333, 111, 222]);
}

#[test]
fn lookup_maps_to_app() {
    let apps = parse_lookup(LOOKUP).unwrap();
    assert_eq!(apps.len(), 1);
    let a = &apps[0];
    assert_eq!(a.id, 389801252);
    assert_eq!(a.developer, "Instagram, Inc.");
    assert_eq!(a.rating, Some(4.68));
    assert_eq!(a.rating_count, 26_000_000);
    assert_eq!(a.genre.as_deref(), Some("Photo & Video"));
    assert_eq!(a.content_rating.as_deref(), Some("12+"));
}

#[test]
fn unrated_app_has_no_rating() {
    let apps = parse_lookup(SEARCH).unwrap();
    assert_eq!(apps[0].rating, None);
    assert_eq!(apps[0].rating_count, 0);
}

#[test]
fn chart_entries_decode() {
    let entries = parse_chart(CHART).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, 42);
    assert_eq!(entries[0].category.as_deref(), Some("Games"));
    assert_eq!(entries[1].price, 2.99);
    assert_eq!(entries[1].developer, "");
    assert_eq!(entries[1].category, None);
}

#[test]
fn single_entry_chart() {
    let body = r#"{"feed": {"entry": {"im:name": {"label": "Solo"}, "id": {"attributes": {"im:id": "7"}}}}}"#;
    let entries = parse_chart(body).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Solo");
}

#[test]
fn empty_chart_and_bad_payload() {
    assert!(parse_chart(r#"{"feed": {}}"#).unwrap().is_empty());
    assert!(matches!(parse_search_ids("<html>"), Err(RankError::Decode(_))));
}
