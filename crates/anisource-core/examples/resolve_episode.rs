//! Debug script walking search -> episodes -> links -> manifest
//!
//! Run with: RUST_LOG=anisource_core=debug cargo run --example resolve_episode -p anisource-core -- "frieren"

use anisource_core::AnimeScraper;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let title = std::env::args().nth(1).unwrap_or_else(|| "frieren".to_string());
    let scraper = AnimeScraper::new()?;

    println!("Searching for '{}'...\n", title);
    let results = scraper.search(&title).await?;
    let Some(anime) = results.first() else {
        println!("No results found!");
        return Ok(());
    };
    println!("Best match: {} ({})\n", anime.title, anime.session);

    let description = scraper.describe(&anime.session).await?;
    println!("English name: {}", description.eng_name);
    println!("Studio: {}", description.studio);
    println!("Duration: {}\n", description.duration);

    let page = scraper.list_episode_page(&anime.session, 1).await?;
    println!(
        "Page {}/{}: {} episodes",
        page.current_page,
        page.last_page,
        page.episodes.len()
    );
    let Some(episode) = page.episodes.first() else {
        return Ok(());
    };

    let links = scraper.stream_links(&episode.episode_session).await?;
    for link in &links {
        println!("   {}p [{}] {}", link.quality, link.provider, link.url);
    }
    let Some(link) = links.iter().find(|l| l.provider == "kwik") else {
        println!("No kwik link for episode {}", episode.episode_number);
        return Ok(());
    };

    match scraper.resolve(&link.url).await {
        Ok(manifest) => {
            println!("\n✓ Manifest from {}", manifest.origin_host);
            for line in manifest.playlist_text.lines().take(10) {
                println!("{}", line);
            }
        }
        Err(e) => println!("\n✗ Failed to resolve manifest: {}", e),
    }

    Ok(())
}
