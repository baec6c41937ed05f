//! Wire formats of the public marketplace endpoints.
#![allow(non_snake_case)]

use serde::Deserialize;

use rankscope_core::App;

#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse {
    #[serde(default)]
    pub resultCount: usize,
    #[serde(default)]
    pub results: Vec<ApiSoftware>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSoftware {
    pub trackId: u64,
    #[serde(default)]
    pub trackName: String,
    #[serde(default)]
    pub artistName: String,
    #[serde(default)]
    pub sellerName: Option<String>,
    #[serde(default)]
    pub averageUserRating: Option<f64>,
    #[serde(default)]
    pub userRatingCount: Option<u64>,
    #[serde(default)]
    pub releaseDate: Option<String>,
    #[serde(default)]
    pub currentVersionReleaseDate: Option<String>,
    #[serde(default)]
    pub primaryGenreName: Option<String>,
    #[serde(default)]
    pub bundleId: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub contentAdvisoryRating: Option<String>,
}

impl From<ApiSoftware> for App {
    fn from(a: ApiSoftware) -> Self {
        let developer = if a.artistName.is_empty() { a.sellerName.unwrap_or_default() } else { a.artistName };
        App {
            id: a.trackId,
            name: a.trackName,
            developer,
            rating: a.averageUserRating,
            rating_count: a.userRatingCount.unwrap_or(0),
            release_date: a.releaseDate,
            current_version_release_date: a.currentVersionReleaseDate,
            genre: a.primaryGenreName,
            bundle_id: a.bundleId,
            price: a.price.unwrap_or(0.0),
            description: a.description,
            version: a.version,
            content_rating: a.contentAdvisoryRating,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiLabel {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiEntryIdAttributes {
    #[serde(rename = "im:id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiEntryId {
    pub attributes: ApiEntryIdAttributes,
}

#[derive(Debug, Deserialize)]
pub struct ApiPriceAttributes {
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPrice {
    pub attributes: Option<ApiPriceAttributes>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCategoryAttributes {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiCategory {
    pub attributes: Option<ApiCategoryAttributes>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChartEntry {
    #[serde(rename = "im:name")]
    pub name: ApiLabel,
    pub id: ApiEntryId,
    #[serde(rename = "im:artist")]
    pub artist: Option<ApiLabel>,
    #[serde(rename = "im:price")]
    pub price: Option<ApiPrice>,
    pub category: Option<ApiCategory>,
}

/// The feed collapses a single entry into an object instead of an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiFeed {
    pub entry: Option<OneOrMany<ApiChartEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChartResponse {
    pub feed: ApiFeed,
}
