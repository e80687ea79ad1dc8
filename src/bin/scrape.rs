use anyhow::{Context, Result, bail};
use pattern_scraper::{
    InMemoryPatternCache, PatternResolver, PatternScraper, ScrapeRequest, ValidationLoop,
    config::Config, llm::LlmClient,
};
use std::sync::Arc;
use url::Url;

const USAGE: &str = "usage: scrape <html-file> <schema-file> [url]";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(html_path), Some(schema_path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let url = args
        .next()
        .map(|raw| Url::parse(&raw).with_context(|| format!("invalid url '{raw}'")))
        .transpose()?;

    let config = Config::from_env()?;

    let html = tokio::fs::read_to_string(&html_path)
        .await
        .with_context(|| format!("failed to read {html_path}"))?;
    let schema = tokio::fs::read_to_string(&schema_path)
        .await
        .with_context(|| format!("failed to read {schema_path}"))?;

    let llm = Arc::new(LlmClient::new(config.llm().clone())?);
    let resolver = PatternResolver::new(llm.clone(), Arc::new(InMemoryPatternCache::new()));
    let validator = ValidationLoop::new(llm.clone(), llm, config.validation());
    let scraper = PatternScraper::new(resolver, validator);

    let mut request = ScrapeRequest::new(html, schema)
        .with_cache_policy(config.cache_policy())
        .with_cleaning(true);
    if let Some(url) = url {
        request = request.with_url(url);
    }

    let outcome = scraper.scrape(request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
