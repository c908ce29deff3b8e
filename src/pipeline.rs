//! One publishing cycle.
//!
//! 1. **Select**: pick the source for the current UTC window
//! 2. **Scrape**: index it and fetch the first article with content
//! 3. **Generate**: ask the LLM for post text (re-asking once if too long)
//! 4. **Publish**: sign and send it, or skip on a dry run

use crate::api::{ChatClient, ask_with_backoff, build_prompt, build_shorter_prompt};
use crate::config::{AiConfig, AppConfig};
use crate::models::{NewsArticle, PostRecord};
use crate::rotation::{current_index, ms_until_next_rotation, next_source};
use crate::scrapers;
use crate::twitter::{MAX_POST_LENGTH, TwitterClient, effective_length, validate_post_text};
use chrono::{DateTime, Utc};
use std::error::Error;
use tracing::{info, instrument, warn};

/// Generate post text for `article`, re-asking once when the first draft
/// is over the length limit.
///
/// A second over-length draft is returned as-is; publishing rejects it.
#[instrument(level = "info", skip_all, fields(source = %article.source))]
pub async fn generate_post_text(
    ai: &AiConfig,
    api_key: &str,
    article: &NewsArticle,
) -> Result<String, Box<dyn Error>> {
    let text = ask_with_backoff(ChatClient::new(ai, api_key), &build_prompt(article)).await?;

    let len = effective_length(&text);
    if len <= MAX_POST_LENGTH {
        return Ok(text);
    }

    warn!(
        length = len,
        limit = MAX_POST_LENGTH,
        "Draft too long; re-asking once"
    );
    let prompt = build_shorter_prompt(article, len, MAX_POST_LENGTH);
    ask_with_backoff(ChatClient::new(ai, api_key), &prompt).await
}

/// Run one cycle at `now`. With `twitter` set to `None` nothing is posted.
#[instrument(level = "info", skip_all, fields(dry_run = twitter.is_none()))]
pub async fn run_once(
    config: &AppConfig,
    ai_api_key: &str,
    twitter: Option<&TwitterClient>,
    now: DateTime<Utc>,
) -> Result<PostRecord, Box<dyn Error>> {
    let rotation = config.rotation()?;
    let index = current_index(now, &rotation);
    let source = config
        .source_at(index)
        .ok_or_else(|| format!("no source configured at index {index}"))?;

    info!(
        source = %source.name,
        index,
        next = %next_source(now, &rotation).name(),
        ms_until_next = ms_until_next_rotation(now, &rotation),
        "Selected source"
    );

    let urls = scrapers::index_articles(source).await?;
    if urls.is_empty() {
        return Err(format!("source {} listed no articles", source.name).into());
    }

    let article = scrapers::fetch_first_article(source, urls)
        .await
        .ok_or_else(|| format!("no article with content from source {}", source.name))?;
    info!(url = %article.url, bytes = article.content.len(), "Using article");

    let generated = generate_post_text(&config.ai, ai_api_key, &article).await?;
    // Dry runs must reject exactly what publishing would.
    let text = validate_post_text(&generated)?;
    info!(length = effective_length(text), "Generated post text");

    let tweet_id = match twitter {
        Some(client) => Some(client.post(text).await?),
        None => {
            info!(%text, "Dry run; not publishing");
            None
        }
    };

    Ok(PostRecord {
        source: source.name.clone(),
        article_url: article.url,
        text: text.to_string(),
        tweet_id,
        posted_at: Utc::now(),
        dry_run: twitter.is_none(),
    })
}
