//! Command-line interface definitions.
//!
//! Secrets are read from flags or, more usually, from the environment.

use crate::error::SigningError;
use crate::oauth::OAuthCredentials;
use clap::{Args, Parser, Subcommand};
use std::fmt;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Publish one post from whichever source owns the current window
/// awful_news_tweets --config config.yaml run
///
/// # Generate without publishing, archiving the result
/// awful_news_tweets run --dry-run --json-output-dir ./posts
///
/// # Inspect the rotation
/// awful_news_tweets status
/// awful_news_tweets schedule --at 2025-05-06T13:05:00Z
///
/// # Verify X/Twitter credentials
/// awful_news_tweets check
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml
    #[arg(short, long, env = "AWFUL_NEWS_TWEETS_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// X/Twitter API base URL
    #[arg(long, env = "TWITTER_API_BASE", default_value = crate::twitter::DEFAULT_API_BASE)]
    pub api_base: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// OAuth 1.0a user-context secrets.
///
/// `Debug` only shows whether each value is present.
#[derive(Args, Default)]
pub struct CredentialArgs {
    /// Consumer (API) key
    #[arg(long, env = "TWITTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Consumer (API) secret
    #[arg(long, env = "TWITTER_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Access token
    #[arg(long, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Access token secret
    #[arg(long, env = "TWITTER_ACCESS_SECRET", hide_env_values = true)]
    pub access_secret: Option<String>,

    /// Key for the LLM gateway (overrides `ai.api_key` in config)
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,
}

impl CredentialArgs {
    /// Validated OAuth bundle; any missing or blank value fails here.
    pub fn oauth(&self) -> Result<OAuthCredentials, SigningError> {
        OAuthCredentials::new(
            self.api_key.clone().unwrap_or_default(),
            self.api_secret.clone().unwrap_or_default(),
            self.access_token.clone().unwrap_or_default(),
            self.access_secret.clone().unwrap_or_default(),
        )
    }
}

impl fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "<redacted>" } else { "<unset>" }
        }
        f.debug_struct("CredentialArgs")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_secret", &redact(&self.access_secret))
            .field("ai_api_key", &redact(&self.ai_api_key))
            .finish()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape, generate, and publish one post
    Run {
        /// Generate but do not publish
        #[arg(long)]
        dry_run: bool,

        /// Directory to archive the post record in
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },

    /// Show current source, next source, and time to next rotation
    Status {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the rotation schedule for the next 24 hours
    Schedule {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },

    /// Check that the X/Twitter credentials authenticate
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::parse_from(["awful_news_tweets", "run"]);
        assert_eq!(cli.config, "config.yaml");
        assert!(matches!(
            cli.command,
            Command::Run {
                dry_run: false,
                json_output_dir: None
            }
        ));
    }

    #[test]
    fn test_cli_run_flags() {
        let cli = Cli::parse_from([
            "awful_news_tweets",
            "-c",
            "/etc/news.yaml",
            "run",
            "--dry-run",
            "-j",
            "/tmp/json",
        ]);
        assert_eq!(cli.config, "/etc/news.yaml");
        match cli.command {
            Command::Run {
                dry_run,
                json_output_dir,
            } => {
                assert!(dry_run);
                assert_eq!(json_output_dir.as_deref(), Some("/tmp/json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_schedule_at() {
        let cli = Cli::parse_from([
            "awful_news_tweets",
            "schedule",
            "--at",
            "2025-05-06T02:00:00Z",
        ]);
        assert!(matches!(
            cli.command,
            Command::Schedule { at: Some(ref at) } if at == "2025-05-06T02:00:00Z"
        ));
    }

    #[test]
    fn test_cli_credential_flags() {
        let cli = Cli::parse_from([
            "awful_news_tweets",
            "--api-key",
            "k",
            "--api-secret",
            "s",
            "--access-token",
            "t",
            "--access-secret",
            "ts",
            "check",
        ]);
        assert_eq!(cli.credentials.api_key.as_deref(), Some("k"));
        assert_eq!(cli.credentials.access_secret.as_deref(), Some("ts"));
        assert!(matches!(cli.command, Command::Check));
        assert!(cli.credentials.oauth().is_ok());
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        let args = CredentialArgs {
            api_key: Some("k".into()),
            api_secret: None,
            access_token: Some("t".into()),
            access_secret: Some("ts".into()),
            ai_api_key: None,
        };
        assert_eq!(
            args.oauth().unwrap_err(),
            SigningError::MissingCredential("consumer_secret")
        );
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let cli = Cli::parse_from([
            "awful_news_tweets",
            "--api-key",
            "ck-visible-in-flags",
            "--api-secret",
            "cs-very-secret",
            "--access-token",
            "at-token",
            "--access-secret",
            "ats-very-secret",
            "--ai-api-key",
            "sk-ai-key",
            "check",
        ]);
        let rendered = format!("{cli:?}");
        for secret in [
            "ck-visible-in-flags",
            "cs-very-secret",
            "at-token",
            "ats-very-secret",
            "sk-ai-key",
        ] {
            assert!(!rendered.contains(secret), "{secret} leaked into {rendered}");
        }
        assert!(rendered.contains("<redacted>"));
    }
}
