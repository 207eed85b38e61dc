//! Anime detail page parser
//!
//! Reads the synopsis container and the `key: value` detail lines of an
//! anime page.

use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::{AnisourceError, Result};
use crate::types::{AnimeDescription, PLACEHOLDER};
use crate::url::absolutize;

const SYNOPSIS_SELECTOR: &str = "div.anime-synopsis";
const DETAIL_SELECTOR: &str = "div.anime-info p";
const EXTERNAL_LINKS_CLASS: &str = "external-links";

/// Parses an anime page into an [`AnimeDescription`]
///
/// # Errors
/// Returns `StructuralMismatch` if the synopsis container is absent. Missing
/// detail lines fall back to [`PLACEHOLDER`].
pub fn parse_description(html: &str) -> Result<AnimeDescription> {
    let document = Html::parse_document(html);

    let synopsis_selector = Selector::parse(SYNOPSIS_SELECTOR)
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Invalid selector: {:?}", e)))?;
    let Some(synopsis_el) = document.select(&synopsis_selector).next() else {
        warn!("Anime page has no synopsis container");
        return Err(AnisourceError::StructuralMismatch(format!(
            "Missing {}",
            SYNOPSIS_SELECTOR
        )));
    };
    let synopsis = synopsis_el
        .text()
        .collect::<String>()
        .replace('"', "")
        .trim()
        .to_string();

    let detail_selector = Selector::parse(DETAIL_SELECTOR)
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Invalid selector: {:?}", e)))?;

    let mut details: HashMap<String, String> = HashMap::new();
    let mut external_links = BTreeMap::new();

    for line in document.select(&detail_selector) {
        if line.value().classes().next() == Some(EXTERNAL_LINKS_CLASS) {
            external_links.extend(parse_external_links(&line)?);
            continue;
        }

        let text = line.text().collect::<String>().replace('\n', "");
        if let Some((key, value)) = text.split_once(':') {
            details.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let field = |key: &str| details.get(key).filter(|v| !v.is_empty()).cloned();

    Ok(AnimeDescription {
        synopsis,
        eng_name: field("english")
            .or_else(|| field("synonyms"))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        duration: field("duration").unwrap_or_else(|| PLACEHOLDER.to_string()),
        studio: field("studio").unwrap_or_else(|| PLACEHOLDER.to_string()),
        external_links,
    })
}

fn parse_external_links(line: &ElementRef) -> Result<Vec<(String, String)>> {
    let anchor = Selector::parse("a[href]")
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Invalid selector: {:?}", e)))?;

    Ok(line
        .select(&anchor)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let name = a.text().collect::<String>().trim().to_string();
            Some((name, absolutize(href)))
        })
        .collect())
}
