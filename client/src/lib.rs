pub mod api_types;
pub mod itunes;
pub mod suggest;

pub use itunes::{ItunesClient, ItunesConfig};
pub use suggest::{LlmKeywordSource, SuggestConfig};
