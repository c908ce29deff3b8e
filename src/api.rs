//! LLM API interaction with exponential backoff retry logic.
//!
//! This module talks to any OpenAI-compatible chat completion endpoint
//! (OpenAI, a local llama.cpp / LM Studio server, a gateway) to turn a
//! scraped article into post text.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait defining async LLM interaction
//! - [`ChatClient`]: `POST {endpoint}` chat completion over `reqwest`
//! - [`RetryAsk`]: decorator that adds retry logic to any `AskAsync`
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//!
//! Retrying lives here, at the call site. The publishing client never
//! retries on its own.

use crate::config::AiConfig;
use crate::models::NewsArticle;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Article text beyond this many characters is not sent to the model.
pub const MAX_ARTICLE_CHARS: usize = 6_000;

/// Trait for async LLM interaction.
///
/// Implementors send text to an LLM and receive a response. This allows
/// different backends or decorators (like retry logic) to stack.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// ```ignore
    /// let client = ChatClient::new(&config.ai, api_key);
    /// let retry_client = RetryAsk::new(client, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat completion client.
pub struct ChatClient<'a> {
    http: Client,
    config: &'a AiConfig,
    api_key: String,
}

impl<'a> ChatClient<'a> {
    pub fn new(config: &'a AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ChatClient<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AskAsync for ChatClient<'_> {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.config.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis(),
                body = %truncate_for_log(&body, 300),
                "API call failed"
            );
            return Err(format!(
                "LLM gateway returned {status}: {}",
                truncate_for_log(&body, 300)
            )
            .into());
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| clean_generated_text(&c.message.content))
            .unwrap_or_default();

        if content.is_empty() {
            return Err("LLM gateway returned an empty completion".into());
        }
        Ok(content)
    }
}

/// Build the user message for one article.
pub fn build_prompt(article: &NewsArticle) -> String {
    let content: String = article.content.chars().take(MAX_ARTICLE_CHARS).collect();
    format!(
        "Source: {}\nURL: {}\n\nArticle:\n{}",
        article.source, article.url, content
    )
}

/// Follow-up prompt used when the first draft was too long.
pub fn build_shorter_prompt(
    article: &NewsArticle,
    previous_length: usize,
    limit: usize,
) -> String {
    format!(
        "{}\n\nYour previous draft was {previous_length} characters. \
         Rewrite it in well under {limit} characters.",
        build_prompt(article)
    )
}

/// Strip whitespace and one pair of wrapping quotes models like to add.
pub fn clean_generated_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

/// High-level function to call the LLM with exponential backoff retry logic.
///
/// Up to 5 retries, delays of 1s, 2s, 4s, 8s, 16s (capped at 30s) plus
/// jitter.
#[instrument(level = "info", skip_all)]
pub async fn ask_with_backoff<T>(client: T, prompt: &str) -> Result<String, Box<dyn Error>>
where
    T: AskAsync<Response = String> + fmt::Debug,
{
    let t0 = Instant::now();
    let api = RetryAsk::new(client, 5, StdDuration::from_secs(1));
    let res = api.ask(prompt).await;
    let dt = t0.elapsed();

    match &res {
        Ok(_) => info!(
            elapsed_ms_total = dt.as_millis(),
            "ask_with_backoff succeeded"
        ),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis(), error = %e, "ask_with_backoff failed")
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct Flaky {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err("transient".into());
            }
            Ok(format!("echo: {text}"))
        }
    }

    fn article() -> NewsArticle {
        NewsArticle {
            source: "npr".to_string(),
            url: "https://text.npr.org/1".to_string(),
            content: "Body text.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let flaky = Flaky {
            failures_left: Cell::new(2),
            calls: Cell::new(0),
        };
        let retry = RetryAsk::new(flaky, 3, StdDuration::from_millis(1));
        let out = retry.ask("hi").await.unwrap();
        assert_eq!(out, "echo: hi");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let flaky = Flaky {
            failures_left: Cell::new(10),
            calls: Cell::new(0),
        };
        let retry = RetryAsk::new(flaky, 1, StdDuration::from_millis(1));
        assert!(retry.ask("hi").await.is_err());
        // first try plus one retry
        assert_eq!(retry.inner.calls.get(), 2);
    }

    #[test]
    fn test_clean_generated_text() {
        assert_eq!(clean_generated_text("  \"Quoted post\"\n"), "Quoted post");
        assert_eq!(clean_generated_text("plain"), "plain");
        assert_eq!(clean_generated_text("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_build_prompt_caps_article_length() {
        let mut a = article();
        a.content = "§".repeat(MAX_ARTICLE_CHARS + 500);
        let prompt = build_prompt(&a);
        assert!(prompt.starts_with("Source: npr\nURL: https://text.npr.org/1"));
        let (_, body) = prompt.split_once("Article:\n").unwrap();
        assert_eq!(body.chars().count(), MAX_ARTICLE_CHARS);
        assert!(body.chars().all(|c| c == '§'));
    }

    #[test]
    fn test_build_shorter_prompt_mentions_lengths() {
        let prompt = build_shorter_prompt(&article(), 312, 280);
        assert!(prompt.contains("312 characters"));
        assert!(prompt.contains("under 280"));
    }

    #[tokio::test]
    async fn test_chat_client_parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [ { "message": { "role": "assistant", "content": " \"A post.\" " } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AiConfig {
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            ..AiConfig::default()
        };
        let client = ChatClient::new(&config, "sk-test");
        assert_eq!(client.ask("article").await.unwrap(), "A post.");
    }

    #[tokio::test]
    async fn test_chat_client_errors_on_non_2xx_and_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/empty"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let fail = AiConfig {
            endpoint: format!("{}/fail", server.uri()),
            ..AiConfig::default()
        };
        let err = ChatClient::new(&fail, "k").ask("x").await.unwrap_err();
        assert!(err.to_string().contains("503"));

        let empty = AiConfig {
            endpoint: format!("{}/empty", server.uri()),
            ..AiConfig::default()
        };
        let err = ChatClient::new(&empty, "k").ask("x").await.unwrap_err();
        assert!(err.to_string().contains("empty completion"));
    }
}
