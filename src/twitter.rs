//! X/Twitter v2 publishing client.
//!
//! [`TwitterClient::post`] validates the text, signs one `POST /2/tweets`
//! with a fresh OAuth 1.0a header, and sends it exactly once. Retrying is
//! the caller's call; a retry goes through `post` again and therefore gets
//! a new nonce, timestamp, and signature.
//!
//! [`TwitterClient::test_connection`] is a signed `GET /2/users/me` probe
//! that reports success as a bool and swallows every error.

use crate::error::TwitterError;
use crate::oauth::{AuthorizationHeader, OAuthCredentials};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Public API host.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Publish endpoint, relative to the API base.
pub const TWEET_PATH: &str = "2/tweets";

/// "Who am I" probe endpoint, relative to the API base.
pub const ME_PATH: &str = "2/users/me";

/// Maximum effective length of a post.
pub const MAX_POST_LENGTH: usize = 280;

/// Weight every bare link counts for after the platform shortens it.
pub const URL_WEIGHT: usize = 23;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Character count as the platform sees it: every `http(s)://` run up to the
/// next whitespace counts as [`URL_WEIGHT`] regardless of its real length.
pub fn effective_length(text: &str) -> usize {
    URL_RE
        .find_iter(text)
        .fold(text.chars().count(), |len, m| {
            len - m.as_str().chars().count() + URL_WEIGHT
        })
}

/// Trim and check `text`, returning the trimmed slice that will be sent.
pub fn validate_post_text(text: &str) -> Result<&str, TwitterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TwitterError::Validation("post text is empty".to_string()));
    }
    let len = effective_length(trimmed);
    if len > MAX_POST_LENGTH {
        return Err(TwitterError::Validation(format!(
            "post text is {len} characters, limit is {MAX_POST_LENGTH}"
        )));
    }
    Ok(trimmed)
}

#[derive(Debug, Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: PostedTweet,
}

/// The success record returned by the publish endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PostedTweet {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Signed client for one account.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: Client,
    credentials: OAuthCredentials,
    tweet_url: Url,
    me_url: Url,
}

impl TwitterClient {
    /// Client against the public API.
    pub fn new(credentials: OAuthCredentials) -> Result<Self, url::ParseError> {
        Self::with_base_url(credentials, DEFAULT_API_BASE)
    }

    /// Client against another host (a proxy, or a mock server in tests).
    ///
    /// A path prefix on `base_url` is kept: `https://proxy.example/x-api`
    /// publishes to `https://proxy.example/x-api/2/tweets`.
    pub fn with_base_url(
        credentials: OAuthCredentials,
        base_url: &str,
    ) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(Self {
            http: Client::new(),
            credentials,
            tweet_url: base.join(TWEET_PATH)?,
            me_url: base.join(ME_PATH)?,
        })
    }

    /// Swap the underlying HTTP client, e.g. to set call-level timeouts.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Publish `text` and return the new post's id.
    ///
    /// # Errors
    ///
    /// - [`TwitterError::Validation`] for empty or over-length text, before
    ///   any network traffic
    /// - [`TwitterError::Signing`] if the header cannot be built
    /// - [`TwitterError::Connectivity`] if the endpoint is unreachable
    /// - [`TwitterError::Publish`] for a non-2xx answer, with status and body
    /// - [`TwitterError::UnexpectedResponse`] for a 2xx answer without an id
    #[instrument(level = "info", skip_all, fields(url = %self.tweet_url))]
    pub async fn post(&self, text: &str) -> Result<String, TwitterError> {
        let text = validate_post_text(text)?;
        let t0 = Instant::now();

        let header = AuthorizationHeader::generate(&self.credentials, "POST", &self.tweet_url)?;
        let response = self
            .http
            .post(self.tweet_url.clone())
            .header(AUTHORIZATION, header.into_string())
            .json(&CreatePost { text })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms,
                body = %truncate_for_log(&body, 300),
                "Publish rejected"
            );
            return Err(TwitterError::Publish {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<CreatePostResponse>(&body) {
            Ok(parsed) => {
                info!(id = %parsed.data.id, elapsed_ms, "Published post");
                Ok(parsed.data.id)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    body = %truncate_for_log(&body, 300),
                    "Publish response had no id"
                );
                Err(TwitterError::UnexpectedResponse { body })
            }
        }
    }

    /// Signed `GET` against the "who am I" endpoint.
    ///
    /// Returns `false` on any failure: signing, transport, or non-2xx.
    #[instrument(level = "info", skip_all, fields(url = %self.me_url))]
    pub async fn test_connection(&self) -> bool {
        let header = match AuthorizationHeader::generate(&self.credentials, "GET", &self.me_url) {
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "Could not sign connectivity probe");
                return false;
            }
        };

        match self
            .http
            .get(self.me_url.clone())
            .header(AUTHORIZATION, header.into_string())
            .send()
            .await
        {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!(status = resp.status().as_u16(), ok, "Connectivity probe answered");
                ok
            }
            Err(e) => {
                warn!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}
