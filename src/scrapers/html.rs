//! Selector-driven HTML scraper.
//!
//! Every configured source is scraped the same way, in two phases:
//!
//! 1. **Indexing**: fetch `index_url`, take `href`s from elements matching
//!    `link_selector`, resolve them against the index URL
//! 2. **Fetching**: fetch each article and join the text of elements
//!    matching `content_selector`
//!
//! Text-only "lite" editions (CNN Lite, NPR Text) work best since their
//! markup is minimal and stable.

use crate::config::SourceConfig;
use crate::models::NewsArticle;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::get;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

fn parse_selector(selector: &str) -> Result<Selector, Box<dyn Error>> {
    Selector::parse(selector)
        .map_err(|e| format!("invalid CSS selector {selector:?}: {e}").into())
}

/// Pull absolute, de-duplicated article links out of an index page.
///
/// Order of first appearance is kept and at most `max` links are returned.
pub fn extract_links(
    html: &str,
    base: &Url,
    link_selector: &str,
    max: usize,
) -> Result<Vec<String>, Box<dyn Error>> {
    let selector = parse_selector(link_selector)?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
        .unique()
        .take(max)
        .collect();
    Ok(links)
}

/// Join the text of every element matching `content_selector`, one line per
/// element.
pub fn extract_content(html: &str, content_selector: &str) -> Result<String, Box<dyn Error>> {
    let selector = parse_selector(content_selector)?;
    let document = Html::parse_document(html);

    let mut content = String::new();
    for element in document.select(&selector) {
        let text = element.text().map(str::trim).filter(|t| !t.is_empty()).join(" ");
        if !text.is_empty() {
            content.push_str(&text);
            content.push('\n');
        }
    }
    Ok(content)
}

/// Index a source's landing page for article URLs.
#[instrument(level = "info", skip_all, fields(source = %source.name, url = %source.index_url))]
pub async fn index_articles(source: &SourceConfig) -> Result<Vec<String>, Box<dyn Error>> {
    let base_url = Url::parse(&source.index_url)?;
    let html = get(base_url.clone())
        .await?
        .error_for_status()?
        .text()
        .await?;
    let article_urls = extract_links(
        &html,
        &base_url,
        &source.link_selector,
        source.max_articles,
    )?;

    info!(count = article_urls.len(), "Indexed article URLs");
    debug!(urls = ?article_urls, "Article URLs");
    Ok(article_urls)
}

/// Fetch one article. `Ok(None)` when the page has no matching text.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article(
    source: &SourceConfig,
    url: &str,
) -> Result<Option<NewsArticle>, Box<dyn Error>> {
    let body = get(url).await?.error_for_status()?.text().await?;
    let content = extract_content(&body, &source.content_selector)?;

    if content.trim().is_empty() {
        return Ok(None);
    }
    info!(bytes = content.len(), "Parsed article");
    Ok(Some(NewsArticle {
        source: source.name.clone(),
        url: url.to_string(),
        content,
    }))
}

/// Try `urls` in order and return the first article with content.
///
/// Failed fetches are logged and skipped. Stops fetching once one succeeds.
#[instrument(level = "info", skip_all, fields(source = %source.name, candidates = urls.len()))]
pub async fn fetch_first_article(source: &SourceConfig, urls: Vec<String>) -> Option<NewsArticle> {
    let articles = stream::iter(urls)
        .then(|url: String| async move {
            match fetch_article(source, &url).await {
                Ok(Some(article)) => Some(article),
                Ok(None) => {
                    warn!(%url, "Fetch produced no content");
                    None
                }
                Err(e) => {
                    error!(error = %e, %url, "Fetch failed");
                    None
                }
            }
        })
        .filter_map(std::future::ready);
    let mut articles = std::pin::pin!(articles);
    articles.next().await
}
