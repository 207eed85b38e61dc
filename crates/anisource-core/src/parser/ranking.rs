//! Ranking table extractor
//!
//! The ranking page renders each column of the table as its own run of
//! nodes. Five independent selections are zipped back into rows by index,
//! which only holds while the page emits exactly one node per row per
//! column. Any length disagreement is reported instead of pairing rows up.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::{AnisourceError, Result};
use crate::types::{PLACEHOLDER, RankedAnimeRecord, RankingPage};

/// Rank badges
pub const RANK_SELECTOR: &str = "span.rank1, span.rank2, span.rank3, span.rank4";

/// Row thumbnails
pub const IMAGE_SELECTOR: &str = r#"img[width="50"][height="70"]"#;

/// Row titles
pub const TITLE_SELECTOR: &str = "h3.anime_ranking_h3";

/// Type / episode count / airing blocks
pub const INFO_SELECTOR: &str = "div.information";

/// Score badges, one class per score bucket
pub const SCORE_SELECTOR: &str = "span.score-10, span.score-9, span.score-8, span.score-7, \
     span.score-6, span.score-5, span.score-4, span.score-3, span.score-2, span.score-1, \
     span.score-na";

const NEXT_SELECTOR: &str = "a.next";
const PREV_SELECTOR: &str = "a.prev";

/// Rank value for unranked rows
pub const UNRANKED: &str = "na";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| AnisourceError::StructuralMismatch(format!("Invalid selector {}: {:?}", css, e)))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts a ranking page
///
/// # Arguments
/// * `html` - Raw HTML of the ranking page
/// * `build_link` - Maps the site's own pagination href (e.g. `?limit=50`)
///   to the link handed to callers
///
/// # Errors
/// Returns `AlignmentMismatch` if the five column selections differ in length.
/// Missing rank, episode count or score text never fails.
pub fn parse_ranking_page<F>(html: &str, build_link: F) -> Result<RankingPage>
where
    F: Fn(&str) -> String,
{
    let document = Html::parse_document(html);

    let ranks: Vec<String> = document
        .select(&selector(RANK_SELECTOR)?)
        .map(|el| normalize_rank(&element_text(&el)))
        .collect();

    let images: Vec<String> = document
        .select(&selector(IMAGE_SELECTOR)?)
        .map(|el| {
            let src = el
                .value()
                .attr("data-src")
                .or_else(|| el.value().attr("src"))
                .unwrap_or_default();
            strip_resize_segment(src)
        })
        .collect();

    let titles: Vec<String> = document
        .select(&selector(TITLE_SELECTOR)?)
        .map(|el| element_text(&el))
        .collect();

    let infos: Vec<(String, String)> = document
        .select(&selector(INFO_SELECTOR)?)
        .map(|el| split_info_block(&el.text().collect::<String>()))
        .collect();

    let scores: Vec<String> = document
        .select(&selector(SCORE_SELECTOR)?)
        .map(|el| {
            let text = element_text(&el);
            if text.is_empty() { PLACEHOLDER.to_string() } else { text }
        })
        .collect();

    let rows = ranks.len();
    if [images.len(), titles.len(), infos.len(), scores.len()]
        .iter()
        .any(|&len| len != rows)
    {
        warn!(
            ranks = ranks.len(),
            images = images.len(),
            titles = titles.len(),
            infos = infos.len(),
            scores = scores.len(),
            "Ranking columns misaligned"
        );
        return Err(AnisourceError::AlignmentMismatch {
            ranks: ranks.len(),
            images: images.len(),
            titles: titles.len(),
            infos: infos.len(),
            scores: scores.len(),
        });
    }

    let records = ranks
        .into_iter()
        .zip(images)
        .zip(titles)
        .zip(infos)
        .zip(scores)
        .map(
            |((((rank, image_url), title), (anime_type, episode_count)), score)| RankedAnimeRecord {
                rank,
                image_url,
                title,
                anime_type,
                episode_count,
                score,
            },
        )
        .collect();

    let next_page_url = pagination_href(&document, NEXT_SELECTOR)?.map(|href| build_link(&href));
    let prev_page_url = pagination_href(&document, PREV_SELECTOR)?.map(|href| build_link(&href));

    Ok(RankingPage {
        records,
        next_page_url,
        prev_page_url,
    })
}

fn pagination_href(document: &Html, css: &str) -> Result<Option<String>> {
    Ok(document
        .select(&selector(css)?)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string))
}

/// Maps the "-" badge of unranked rows to [`UNRANKED`]
pub fn normalize_rank(text: &str) -> String {
    match text {
        "-" | "" => UNRANKED.to_string(),
        other => other.to_string(),
    }
}

/// Removes the resize proxy segment of a thumbnail URL
///
/// `https://cdn.myanimelist.net/r/50x70/images/anime/1/2.jpg` becomes
/// `https://cdn.myanimelist.net/images/anime/1/2.jpg`. Only the span from
/// the first `/r/` up to the last `/i` after it is cut; URLs without that
/// pair are returned unchanged.
pub fn strip_resize_segment(url: &str) -> String {
    let Some(start) = url.find("/r/") else {
        return url.to_string();
    };
    match url.rfind("/i") {
        Some(end) if end > start => format!("{}{}", &url[..start], &url[end..]),
        _ => url.to_string(),
    }
}

/// Splits an info block into (type, episode count)
///
/// Whitespace is dropped first, so `"TV (24 eps)\n Apr 2009 - Jul 2010"`
/// yields `("TV", "24")`. Without a parenthesized part the whole text is the
/// type and the episode count is [`PLACEHOLDER`].
pub fn split_info_block(text: &str) -> (String, String) {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let parens = compact
        .find('(')
        .and_then(|open| compact[open..].find(')').map(|close| (open, open + close)));

    match parens {
        Some((open, close)) => {
            let anime_type = non_empty(&compact[..open]);
            let inner = &compact[open + 1..close];
            let episodes = non_empty(inner.strip_suffix("eps").unwrap_or(inner));
            (anime_type, episodes)
        }
        None => (non_empty(&compact), PLACEHOLDER.to_string()),
    }
}

fn non_empty(text: &str) -> String {
    if text.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text.to_string()
    }
}
