//! Core data types for the extraction engine
//!
//! All records are immutable values once built. Field names match the JSON
//! shape handed to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel used for optional fields missing from a source document
pub const PLACEHOLDER: &str = "-";

/// Best-match title record from the anime site search endpoint
///
/// Only `session` and `title` are typed; every other field the site sends is
/// kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Site-assigned session identifier (rotates periodically)
    pub session: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Remaining fields, passed through untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// One episode entry of a paginated release listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeDescriptor {
    /// Session identifier of the episode
    pub episode_session: String,

    /// Episode number as listed by the source
    pub episode_number: i64,

    /// All other fields of the release entry
    pub metadata: Map<String, Value>,
}

/// A single page of a release listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodePage {
    /// Episodes in ascending episode order
    pub episodes: Vec<EpisodeDescriptor>,

    /// Page number this listing corresponds to
    pub current_page: u32,

    /// Last available page
    pub last_page: u32,
}

/// Synopsis and detail table of an anime page
///
/// Every field except `synopsis` degrades to [`PLACEHOLDER`] when the source
/// omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeDescription {
    pub synopsis: String,
    pub eng_name: String,
    pub duration: String,
    pub studio: String,

    /// Link text -> absolute URL
    pub external_links: BTreeMap<String, String>,
}

/// One playable source for an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    /// Quality label as sent by the source (e.g. "1080")
    pub quality: String,

    /// Provider key (e.g. "kwik")
    pub provider: String,

    /// Embed page URL
    pub url: String,
}

/// The final artifact of manifest resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedManifest {
    /// Raw playlist document
    pub playlist_text: String,

    /// Reconstructed stream host (scheme included, no trailing slash)
    pub origin_host: String,
}

/// One row of a ranking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAnimeRecord {
    /// Rank numeral, or "na" for unranked rows
    pub rank: String,
    pub image_url: String,
    pub title: String,
    pub anime_type: String,
    pub episode_count: String,
    pub score: String,
}

/// A ranking table plus its pagination links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPage {
    /// Rows in source page order
    pub records: Vec<RankedAnimeRecord>,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
}

/// Ranking tables exposed by the ranking site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopAnimeCategory {
    Airing,
    Upcoming,
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    ByPopularity,
    Favorite,
}

impl TopAnimeCategory {
    /// Value of the `type` query parameter on the ranking site
    pub fn as_query(&self) -> &'static str {
        match self {
            TopAnimeCategory::Airing => "airing",
            TopAnimeCategory::Upcoming => "upcoming",
            TopAnimeCategory::Tv => "tv",
            TopAnimeCategory::Movie => "movie",
            TopAnimeCategory::Ova => "ova",
            TopAnimeCategory::Ona => "ona",
            TopAnimeCategory::Special => "special",
            TopAnimeCategory::ByPopularity => "bypopularity",
            TopAnimeCategory::Favorite => "favorite",
        }
    }
}
