//! URL helper functions
//!
//! Builds every outbound URL from a configured base URL. Bases are taken
//! without a trailing slash.

use crate::types::TopAnimeCategory;

/// Builds the search API URL for a title
///
/// # Example
/// ```
/// use anisource_core::url::build_search_url;
/// let url = build_search_url("https://animepahe.com", "one piece");
/// assert_eq!(url, "https://animepahe.com/api?m=search&q=one%20piece");
/// ```
pub fn build_search_url(site_url: &str, query: &str) -> String {
    format!("{}/api?m=search&q={}", site_url, urlencoding::encode(query))
}

/// Builds the release listing URL for one page of episodes
///
/// # Example
/// ```
/// use anisource_core::url::build_release_url;
/// let url = build_release_url("https://animepahe.com", "abc-123", 2);
/// assert_eq!(url, "https://animepahe.com/api?m=release&id=abc-123&sort=episode_asc&page=2");
/// ```
pub fn build_release_url(site_url: &str, anime_session: &str, page: u32) -> String {
    format!(
        "{}/api?m=release&id={}&sort=episode_asc&page={}",
        site_url,
        urlencoding::encode(anime_session),
        page
    )
}

/// Builds the stream links URL for an episode
///
/// # Example
/// ```
/// use anisource_core::url::build_links_url;
/// let url = build_links_url("https://animepahe.com", "ep-9");
/// assert_eq!(url, "https://animepahe.com/api?m=links&id=ep-9&p=kwik");
/// ```
pub fn build_links_url(site_url: &str, episode_session: &str) -> String {
    format!(
        "{}/api?m=links&id={}&p=kwik",
        site_url,
        urlencoding::encode(episode_session)
    )
}

/// Builds the anime detail page URL
pub fn build_anime_url(site_url: &str, anime_session: &str) -> String {
    format!("{}/anime/{}", site_url, urlencoding::encode(anime_session))
}

/// Builds the referer announced for description and episode calls
///
/// # Example
/// ```
/// use anisource_core::url::build_session_referer;
/// let referer = build_session_referer("https://animepahe.com", "abc-123");
/// assert_eq!(referer, "https://animepahe.com/abc-123");
/// ```
pub fn build_session_referer(site_url: &str, anime_session: &str) -> String {
    format!("{}/{}", site_url, anime_session)
}

/// Builds the ranking page URL
///
/// `limit` is the offset of the first row on the page (0, 50, 100, ...).
///
/// # Example
/// ```
/// use anisource_core::TopAnimeCategory;
/// use anisource_core::url::build_top_anime_url;
/// let url = build_top_anime_url("https://myanimelist.net", TopAnimeCategory::ByPopularity, 50);
/// assert_eq!(url, "https://myanimelist.net/topanime.php?type=bypopularity&limit=50");
/// ```
pub fn build_top_anime_url(ranking_site_url: &str, category: TopAnimeCategory, limit: u32) -> String {
    format!(
        "{}/topanime.php?type={}&limit={}",
        ranking_site_url,
        category.as_query(),
        limit
    )
}

/// Makes a protocol-relative link absolute
///
/// # Example
/// ```
/// use anisource_core::url::absolutize;
/// assert_eq!(absolutize("//myanimelist.net/anime/21"), "https://myanimelist.net/anime/21");
/// assert_eq!(absolutize("https://anidb.net/a69"), "https://anidb.net/a69");
/// ```
pub fn absolutize(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    }
}
