//! Anisource Core Library
//!
//! Resolves playable stream manifests, episode listings and ranking tables
//! from anime sites that expose no stable public API.
//!
//! # Overview
//!
//! This crate provides:
//! - A thin HTTP fetch client with the referer/origin header sets the source
//!   sites' hotlink checks require
//! - Pure parsers that rebuild structured records from loosely structured
//!   HTML and JSON
//! - A high-level [`AnimeScraper`] API tying the two together
//!
//! # Example
//!
//! ```no_run
//! use anisource_core::{AnimeScraper, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scraper = AnimeScraper::new()?;
//!
//!     let results = scraper.search("frieren").await?;
//!     let Some(anime) = results.first() else { return Ok(()) };
//!
//!     let episodes = scraper.list_episodes(&anime.session, 1).await?;
//!     if let Some(episode) = episodes.first() {
//!         let links = scraper.stream_links(&episode.episode_session).await?;
//!         if let Some(link) = links.first() {
//!             let manifest = scraper.resolve(&link.url).await?;
//!             println!("{}", manifest.playlist_text);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Structural contracts
//!
//! Every parser depends on the current markup of its source page. When a
//! site changes, extraction fails loudly with
//! [`AnisourceError::StructuralMismatch`], [`AnisourceError::DecodeError`]
//! or [`AnisourceError::AlignmentMismatch`] instead of returning guessed
//! data. The embed page assumptions live in [`ManifestContract`].

mod client;
mod error;
pub mod headers;
pub mod parser;
mod scraper;
mod types;
pub mod url;

// Re-export client types
pub use client::{AnisourceClient, ClientConfig};

// Re-export error types
pub use error::{AnisourceError, Result};

// Re-export parser entry points
pub use parser::{
    ManifestContract, ManifestLocation, parse_description, parse_manifest_location,
    parse_ranking_page, parse_release_page, parse_search_response, parse_stream_links,
};

// Re-export main scraper API
pub use scraper::AnimeScraper;

// Re-export data types
pub use types::{
    AnimeDescription, EpisodeDescriptor, EpisodePage, PLACEHOLDER, RankedAnimeRecord,
    RankingPage, ResolvedManifest, SearchResult, StreamLink, TopAnimeCategory,
};
