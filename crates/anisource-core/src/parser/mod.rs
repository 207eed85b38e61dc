//! Parsers for the source sites
//!
//! Pure functions over raw HTML / JSON text; none of them touch the network.

pub mod api;
pub mod description;
pub mod manifest;
pub mod ranking;

pub use api::{parse_release_page, parse_search_response, parse_stream_links};
pub use description::parse_description;
pub use manifest::{ManifestContract, ManifestLocation, WINDOW_LEN, parse_manifest_location};
pub use ranking::parse_ranking_page;
