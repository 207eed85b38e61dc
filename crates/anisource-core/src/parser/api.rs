//! Parsers for the anime site's JSON API
//!
//! The API is undocumented; only the fields read here are relied upon and
//! everything else is carried through untouched.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AnisourceError, Result};
use crate::types::{EpisodeDescriptor, EpisodePage, SearchResult, StreamLink};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct ReleaseEnvelope {
    #[serde(default = "first_page")]
    current_page: u32,
    #[serde(default = "first_page")]
    last_page: u32,
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct LinksEnvelope {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

fn first_page() -> u32 {
    1
}

fn from_json<'a, T: Deserialize<'a>>(body: &'a str, what: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Unexpected {} JSON: {}", what, e)))
}

/// Parses a search response
///
/// A response without `data` (no matches) yields an empty list.
pub fn parse_search_response(body: &str) -> Result<Vec<SearchResult>> {
    let envelope: SearchEnvelope = from_json(body, "search")?;
    Ok(envelope.data)
}

/// Parses one page of a release listing
///
/// # Errors
/// Returns `StructuralMismatch` if an entry lacks a `session` string or an
/// integral `episode` number.
pub fn parse_release_page(body: &str) -> Result<EpisodePage> {
    let envelope: ReleaseEnvelope = from_json(body, "release")?;

    let episodes = envelope
        .data
        .into_iter()
        .map(episode_from_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(EpisodePage {
        episodes,
        current_page: envelope.current_page,
        last_page: envelope.last_page,
    })
}

fn episode_from_entry(mut entry: Map<String, Value>) -> Result<EpisodeDescriptor> {
    let episode_session = match entry.remove("session") {
        Some(Value::String(session)) => session,
        _ => {
            return Err(AnisourceError::StructuralMismatch(
                "Release entry without session".to_string(),
            ));
        }
    };

    let episode_number = entry
        .remove("episode")
        .as_ref()
        .and_then(parse_episode_number)
        .ok_or_else(|| {
            AnisourceError::StructuralMismatch(format!(
                "Release entry {} has no integral episode number",
                episode_session
            ))
        })?;

    Ok(EpisodeDescriptor {
        episode_session,
        episode_number,
        metadata: entry,
    })
}

/// Episode numbers arrive as JSON numbers or numeric strings
fn parse_episode_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses a stream links response
///
/// Each `data` element maps a quality label to an object of provider URLs,
/// e.g. `{"1080": {"kwik": "https://kwik.cx/e/abc", "audio": "jpn"}}`. Only
/// absolute http(s) values are taken as links; a quality/provider pair is
/// emitted once.
pub fn parse_stream_links(body: &str) -> Result<Vec<StreamLink>> {
    let envelope: LinksEnvelope = from_json(body, "links")?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for entry in envelope.data {
        for (quality, providers) in entry {
            let Value::Object(providers) = providers else {
                continue;
            };
            for (provider, url) in providers {
                let Value::String(url) = url else { continue };
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    continue;
                }
                if seen.insert((quality.clone(), provider.clone())) {
                    links.push(StreamLink {
                        quality: quality.clone(),
                        provider,
                        url,
                    });
                }
            }
        }
    }

    Ok(links)
}
