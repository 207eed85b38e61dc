//! Main scraper API
//!
//! Combines the fetch client, header sets and parsers into the operations
//! callers use. Every call is a self-contained request/response cycle; the
//! scraper holds no per-call state and caches nothing.

use tracing::debug;

use crate::client::{AnisourceClient, ClientConfig};
use crate::error::{AnisourceError, Result};
use crate::headers::{referer_headers, request_headers, stream_host_headers};
use crate::parser::{
    ManifestContract, ManifestLocation, parse_description, parse_manifest_location, parse_ranking_page,
    parse_release_page, parse_search_response, parse_stream_links,
};
use crate::types::{
    AnimeDescription, EpisodeDescriptor, EpisodePage, RankingPage, ResolvedManifest, SearchResult,
    StreamLink, TopAnimeCategory,
};
use crate::url::{
    build_anime_url, build_links_url, build_release_url, build_search_url, build_session_referer,
    build_top_anime_url,
};

/// Main scraper API
///
/// Talks to the anime site (search, episodes, descriptions, stream links),
/// the kwik embed host (manifest resolution) and the ranking site.
pub struct AnimeScraper {
    client: AnisourceClient,
    config: ClientConfig,
    contract: ManifestContract,
}

fn require_non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AnisourceError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}

impl AnimeScraper {
    /// Create a new scraper with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new scraper with custom client configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = AnisourceClient::with_config(&config)?;
        Ok(Self {
            client,
            config,
            contract: ManifestContract::CURRENT,
        })
    }

    /// Replace the embed page contract used by [`AnimeScraper::resolve`]
    pub fn with_manifest_contract(mut self, contract: ManifestContract) -> Self {
        self.contract = contract;
        self
    }

    /// The embed page contract in use
    pub fn manifest_contract(&self) -> &ManifestContract {
        &self.contract
    }

    /// Search the anime site by title
    ///
    /// # Returns
    /// Matches in the order the site ranks them, empty if nothing matched
    ///
    /// # Errors
    /// - `InvalidInput` if title is empty or whitespace only
    /// - `Upstream` / `UpstreamStatus` if the request fails
    /// - `StructuralMismatch` if the response is not the expected JSON
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> anisource_core::Result<()> {
    /// use anisource_core::AnimeScraper;
    /// let scraper = AnimeScraper::new()?;
    /// for anime in scraper.search("hunter x hunter").await? {
    ///     println!("{}: {}", anime.session, anime.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(&self, title: &str) -> Result<Vec<SearchResult>> {
        let title = require_non_empty(title, "Search title")?;
        let url = build_search_url(&self.config.site_url, title);
        let body = self.client.fetch_text(&url, request_headers(&[])?).await?;
        parse_search_response(&body)
    }

    /// Fetch one page of an anime's episode listing
    ///
    /// Pagination is driven by the caller; use `last_page` of the result to
    /// decide whether to ask for more.
    ///
    /// # Errors
    /// - `InvalidInput` if the session is empty or `page` is 0
    /// - `Upstream` / `UpstreamStatus` if the request fails
    /// - `StructuralMismatch` if an entry lacks its session or episode number
    pub async fn list_episode_page(&self, anime_session: &str, page: u32) -> Result<EpisodePage> {
        let anime_session = require_non_empty(anime_session, "Anime session")?;
        if page == 0 {
            return Err(AnisourceError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }

        let url = build_release_url(&self.config.site_url, anime_session, page);
        let referer = build_session_referer(&self.config.site_url, anime_session);
        let body = self.client.fetch_text(&url, referer_headers(&referer)?).await?;
        parse_release_page(&body)
    }

    /// Fetch the episodes on one page of an anime's episode listing
    ///
    /// Exactly one request is made; further pages are not followed.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> anisource_core::Result<()> {
    /// use anisource_core::AnimeScraper;
    /// let scraper = AnimeScraper::new()?;
    /// let episodes = scraper.list_episodes("a0c4b5e1-hxh", 1).await?;
    /// for episode in episodes {
    ///     println!("{} -> {}", episode.episode_number, episode.episode_session);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_episodes(&self, anime_session: &str, page: u32) -> Result<Vec<EpisodeDescriptor>> {
        Ok(self.list_episode_page(anime_session, page).await?.episodes)
    }

    /// Fetch the synopsis and details of an anime
    ///
    /// # Errors
    /// - `InvalidInput` if the session is empty
    /// - `Upstream` / `UpstreamStatus` if the request fails
    /// - `StructuralMismatch` if the page has no synopsis container
    pub async fn describe(&self, anime_session: &str) -> Result<AnimeDescription> {
        let anime_session = require_non_empty(anime_session, "Anime session")?;
        let url = build_anime_url(&self.config.site_url, anime_session);
        let referer = build_session_referer(&self.config.site_url, anime_session);
        let html = self.client.fetch_text(&url, referer_headers(&referer)?).await?;
        parse_description(&html)
    }

    /// List the embed links available for an episode
    ///
    /// # Errors
    /// - `InvalidInput` if the session is empty
    /// - `Upstream` / `UpstreamStatus` if the request fails
    /// - `StructuralMismatch` if the response is not the expected JSON
    pub async fn stream_links(&self, episode_session: &str) -> Result<Vec<StreamLink>> {
        let episode_session = require_non_empty(episode_session, "Episode session")?;
        let url = build_links_url(&self.config.site_url, episode_session);
        let body = self.client.fetch_text(&url, request_headers(&[])?).await?;
        parse_stream_links(&body)
    }

    /// Resolve an embed page into its playlist
    ///
    /// The embed page is fetched with the anime site as referer, its packed
    /// script is decoded into the playlist URL, and the playlist is fetched
    /// with the kwik origin/referer pair the stream host checks for.
    ///
    /// # Errors
    /// - `InvalidInput` if the embed URL is empty
    /// - `Upstream` / `UpstreamStatus` if either fetch fails
    /// - `StructuralMismatch` if the script block or token run is missing;
    ///   the stream host is not contacted in that case
    /// - `DecodeError` if the token run cannot be decoded
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> anisource_core::Result<()> {
    /// use anisource_core::AnimeScraper;
    /// let scraper = AnimeScraper::new()?;
    /// let manifest = scraper.resolve("https://kwik.cx/e/Xy12AbCd").await?;
    /// println!("{} from {}", manifest.playlist_text.lines().count(), manifest.origin_host);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Note
    /// Playlist segment URLs are signed and expire; do not cache the result.
    pub async fn resolve(&self, embed_url: &str) -> Result<ResolvedManifest> {
        let embed_url = require_non_empty(embed_url, "Embed URL")?;

        let embed_html = self
            .client
            .fetch_text(embed_url, referer_headers(&self.config.site_url)?)
            .await?;

        let location = parse_manifest_location(&embed_html, &self.contract)?;
        debug!(
            contract = self.contract.version,
            host = %location.host,
            "Decoded manifest location"
        );

        self.fetch_manifest(&location).await
    }

    /// Fetch the playlist at a decoded location with the kwik origin/referer pair
    pub(crate) async fn fetch_manifest(&self, location: &ManifestLocation) -> Result<ResolvedManifest> {
        let playlist_text = self
            .client
            .fetch_text(&location.url, stream_host_headers()?)
            .await?;

        Ok(ResolvedManifest {
            playlist_text,
            origin_host: location.host.clone(),
        })
    }

    /// Fetch and extract a ranking page
    ///
    /// # Arguments
    /// * `category` - Which ranking table to read
    /// * `limit` - Offset of the first row (the site pages in steps of 50)
    /// * `build_link` - Maps the site's pagination href (e.g. `?limit=50`)
    ///   to the link returned in `next_page_url` / `prev_page_url`
    ///
    /// # Errors
    /// - `Upstream` / `UpstreamStatus` if the request fails
    /// - `AlignmentMismatch` if the page's columns disagree in length
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> anisource_core::Result<()> {
    /// use anisource_core::{AnimeScraper, TopAnimeCategory};
    /// let scraper = AnimeScraper::new()?;
    /// let page = scraper
    ///     .top_anime(TopAnimeCategory::Airing, 0, |href| format!("/top_anime{}", href))
    ///     .await?;
    /// for record in &page.records {
    ///     println!("#{} {} ({})", record.rank, record.title, record.score);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn top_anime<F>(
        &self,
        category: TopAnimeCategory,
        limit: u32,
        build_link: F,
    ) -> Result<RankingPage>
    where
        F: Fn(&str) -> String,
    {
        let url = build_top_anime_url(&self.config.ranking_site_url, category, limit);
        let html = self.client.fetch_text(&url, request_headers(&[])?).await?;
        parse_ranking_page(&html, build_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper_for(server: &MockServer) -> AnimeScraper {
        let config = ClientConfig {
            site_url: server.uri(),
            ranking_site_url: server.uri(),
            ..ClientConfig::default()
        };
        AnimeScraper::with_config(config).unwrap()
    }

    fn embed_page(payload: &str) -> String {
        let mut html = String::from("<html><head>");
        for i in 0..6 {
            html.push_str(&format!("<script>var s{} = {};</script>", i, i));
        }
        html.push_str(&format!("<script>{}</script>", payload));
        html.push_str("</head><body><video></video></body></html>");
        html
    }

    #[test]
    fn test_scraper_creation() {
        let scraper = AnimeScraper::new();
        assert!(scraper.is_ok());
    }

    #[test]
    fn test_default_contract() {
        let scraper = AnimeScraper::new().unwrap();
        assert_eq!(scraper.manifest_contract(), &ManifestContract::CURRENT);

        let custom = ManifestContract {
            version: "next",
            script_index: 4,
            ..ManifestContract::CURRENT
        };
        let scraper = scraper.with_manifest_contract(custom);
        assert_eq!(scraper.manifest_contract().script_index, 4);
    }

    #[tokio::test]
    async fn test_search_empty_title() {
        let scraper = AnimeScraper::new().unwrap();
        match scraper.search("   ").await {
            Err(AnisourceError::InvalidInput(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[tokio::test]
    async fn test_list_episodes_page_zero() {
        let scraper = AnimeScraper::new().unwrap();
        let result = scraper.list_episodes("abc", 0).await;
        assert!(matches!(result, Err(AnisourceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("m", "search"))
            .and(query_param("q", "one piece"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"total":1,"data":[{"id":4,"title":"One Piece","session":"op-1"}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let results = scraper_for(&server).search("one piece").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].session, "op-1");
    }

    #[tokio::test]
    async fn test_list_episodes_sends_session_referer() {
        let server = MockServer::start().await;
        let referer = format!("{}/hxh-2011", server.uri());
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("m", "release"))
            .and(query_param("id", "hxh-2011"))
            .and(query_param("sort", "episode_asc"))
            .and(query_param("page", "2"))
            .and(header("referer", referer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"current_page":2,"last_page":5,"data":[
                    {"episode":31,"session":"e31","duration":"00:23:40"},
                    {"episode":32,"session":"e32","duration":"00:23:40"}
                ]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let episodes = scraper_for(&server).list_episodes("hxh-2011", 2).await.unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].episode_number, 31);
        assert_eq!(episodes[1].episode_session, "e32");
    }

    #[tokio::test]
    async fn test_describe_sends_session_referer() {
        let server = MockServer::start().await;
        let referer = format!("{}/hxh-2011", server.uri());
        Mock::given(method("GET"))
            .and(path("/anime/hxh-2011"))
            .and(header("referer", referer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="anime-synopsis">Hunters.</div>
                   <div class="anime-info"><p><strong>Studio:</strong> Madhouse</p></div>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let description = scraper_for(&server).describe("hxh-2011").await.unwrap();
        assert_eq!(description.synopsis, "Hunters.");
        assert_eq!(description.studio, "Madhouse");
        assert_eq!(description.eng_name, "-");
    }

    #[tokio::test]
    async fn test_describe_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/gone"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = scraper_for(&server).describe("gone").await;
        match result {
            Err(AnisourceError::UpstreamStatus { status, .. }) => assert_eq!(status, 503),
            _ => panic!("Expected UpstreamStatus error"),
        }
    }

    #[tokio::test]
    async fn test_stream_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("m", "links"))
            .and(query_param("id", "e31"))
            .and(query_param("p", "kwik"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"720":{"kwik":"https://kwik.cx/e/abc","audio":"jpn"}}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let links = scraper_for(&server).stream_links("e31").await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].quality, "720");
        assert_eq!(links[0].provider, "kwik");
        assert_eq!(links[0].url, "https://kwik.cx/e/abc");
    }

    #[tokio::test]
    async fn test_resolve_structural_mismatch_skips_stream_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/e/abc"))
            .and(header("referer", server.uri().as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(embed_page("var player = new Plyr('#player');")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let scraper = scraper_for(&server);
        let result = scraper.resolve(&format!("{}/e/abc", server.uri())).await;
        assert!(matches!(result, Err(AnisourceError::StructuralMismatch(_))));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_short_token_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/e/short"))
            .respond_with(ResponseTemplate::new(200).set_body_string(embed_page(
                "eval(function(p,a,c,k,e,d){return p}('0 1',36,4,'|||m3u8|uwu|x'.split('|'),0,{}))",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = scraper_for(&server)
            .resolve(&format!("{}/e/short", server.uri()))
            .await;
        assert!(matches!(result, Err(AnisourceError::DecodeError(_))));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_manifest_sends_kwik_origin() {
        let server = MockServer::start().await;
        let playlist = "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:10.0,\nseg-1.ts\n#EXT-X-ENDLIST\n";
        Mock::given(method("GET"))
            .and(path("/stream/08/3f9a0c/uwu.m3u8"))
            .and(header("origin", "https://kwik.cx"))
            .and(header("referer", "https://kwik.cx/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(playlist))
            .expect(1)
            .mount(&server)
            .await;

        let location = ManifestLocation {
            host: server.uri(),
            url: format!("{}/stream/08/3f9a0c/uwu.m3u8", server.uri()),
        };
        let manifest = scraper_for(&server).fetch_manifest(&location).await.unwrap();
        assert_eq!(manifest.playlist_text, playlist);
        assert_eq!(manifest.origin_host, server.uri());
    }

    #[tokio::test]
    async fn test_fetch_manifest_stream_host_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/expired.m3u8"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let location = ManifestLocation {
            host: server.uri(),
            url: format!("{}/stream/expired.m3u8", server.uri()),
        };
        match scraper_for(&server).fetch_manifest(&location).await {
            Err(AnisourceError::UpstreamStatus { status, .. }) => assert_eq!(status, 403),
            _ => panic!("Expected UpstreamStatus error"),
        }
    }

    #[tokio::test]
    async fn test_resolve_embed_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/e/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = scraper_for(&server)
            .resolve(&format!("{}/e/missing", server.uri()))
            .await;
        match result {
            Err(e) => assert!(e.is_upstream()),
            Ok(_) => panic!("Expected upstream error"),
        }
    }

    #[tokio::test]
    async fn test_top_anime() {
        let server = MockServer::start().await;
        let html = r#"
        <html><body>
        <a href="?type=tv&amp;limit=50" class="link-blue-box next">Next 50</a>
        <table>
            <tr class="ranking-list">
                <td><span class="rank1">1</span></td>
                <td>
                    <img width="50" height="70" data-src="https://cdn.myanimelist.net/r/50x70/images/anime/1208/94745.jpg?s=a">
                    <h3 class="anime_ranking_h3"><a>Frieren</a></h3>
                    <div class="information">TV (28 eps)<br>Sep 2023 - Mar 2024</div>
                </td>
                <td><span class="text on score-9">9.30</span></td>
            </tr>
        </table>
        </body></html>
        "#;
        Mock::given(method("GET"))
            .and(path("/topanime.php"))
            .and(query_param("type", "tv"))
            .and(query_param("limit", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&server)
            .await;

        let page = scraper_for(&server)
            .top_anime(TopAnimeCategory::Tv, 0, |href| format!("/top_anime{}", href))
            .await
            .unwrap();

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "Frieren");
        assert_eq!(
            page.records[0].image_url,
            "https://cdn.myanimelist.net/images/anime/1208/94745.jpg?s=a"
        );
        assert_eq!(page.records[0].episode_count, "28");
        assert_eq!(page.next_page_url, Some("/top_anime?type=tv&limit=50".to_string()));
        assert_eq!(page.prev_page_url, None);
    }
}
