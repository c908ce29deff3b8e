//! # Awful News Tweets
//!
//! Command-line entry point. See [`awful_news_tweets::cli::Cli`] for usage.

use awful_news_tweets::cli::{Cli, Command, CredentialArgs};
use awful_news_tweets::config::AppConfig;
use awful_news_tweets::outputs::json;
use awful_news_tweets::pipeline;
use awful_news_tweets::rotation::{current_source, ms_until_next_rotation, next_source, schedule};
use awful_news_tweets::twitter::TwitterClient;
use awful_news_tweets::utils::ensure_writable_dir;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("awful_news_tweets starting up");

    let args = Cli::parse();
    debug!(config = %args.config, api_base = %args.api_base, "Parsed CLI arguments");

    match &args.command {
        Command::Run {
            dry_run,
            json_output_dir,
        } => {
            let config = AppConfig::load(&args.config).await?;
            run(&args, &config, *dry_run, json_output_dir.as_deref()).await?;
        }
        Command::Status { at } => {
            let config = AppConfig::load(&args.config).await?;
            let rotation = config.rotation()?;
            let now = parse_at(at.as_deref())?;
            println!("now:     {}", now.to_rfc3339());
            println!("current: {}", current_source(now, &rotation).name());
            println!("next:    {}", next_source(now, &rotation).name());
            println!("next in: {} ms", ms_until_next_rotation(now, &rotation));
        }
        Command::Schedule { at } => {
            let config = AppConfig::load(&args.config).await?;
            let rotation = config.rotation()?;
            let now = parse_at(at.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&schedule(now, &rotation))?);
        }
        Command::Check => {
            let client = twitter_client(&args.credentials, &args.api_base)?;
            if !client.test_connection().await {
                error!("X/Twitter credentials did not authenticate");
                return Err("connection check failed".into());
            }
            info!("X/Twitter credentials OK");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// One publishing cycle, optionally archived to `json_output_dir`.
async fn run(
    args: &Cli,
    config: &AppConfig,
    dry_run: bool,
    json_output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    // Early check: fail before spending an LLM call if the archive is unusable
    if let Some(dir) = json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let ai_api_key = args
        .credentials
        .ai_api_key
        .clone()
        .or_else(|| config.ai.api_key.clone())
        .ok_or("no LLM API key: set AI_API_KEY or ai.api_key")?;

    let twitter = if dry_run {
        None
    } else {
        Some(twitter_client(&args.credentials, &args.api_base)?)
    };

    let record = pipeline::run_once(config, &ai_api_key, twitter.as_ref(), Utc::now()).await?;
    info!(
        source = %record.source,
        tweet_id = ?record.tweet_id,
        dry_run = record.dry_run,
        "Cycle finished"
    );

    if let Some(dir) = json_output_dir {
        json::write_post_record(&record, dir).await?;
    }

    Ok(())
}

fn twitter_client(
    credentials: &CredentialArgs,
    api_base: &str,
) -> Result<TwitterClient, Box<dyn Error>> {
    let oauth = credentials.oauth()?;
    Ok(TwitterClient::with_base_url(oauth, api_base)?)
}

fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>, Box<dyn Error>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
