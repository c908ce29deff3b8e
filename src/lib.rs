//! # Awful News Tweets
//!
//! Posts one LLM-written news summary at a time to X/Twitter, rotating
//! through a fixed list of news sources on a UTC wall-clock schedule.
//!
//! ## Architecture
//!
//! 1. **Rotation**: [`rotation`] maps a UTC instant to the source that owns
//!    the current window. It is stateless; the same instant always gives
//!    the same answer.
//! 2. **Scraping**: [`scrapers`] indexes that source and fetches an article.
//! 3. **Generation**: [`api`] asks an OpenAI-compatible endpoint for post text.
//! 4. **Publishing**: [`twitter`] signs the request with OAuth 1.0a
//!    ([`oauth`]) and posts it.
//!
//! [`pipeline::run_once`] ties the four together.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod outputs;
pub mod pipeline;
pub mod rotation;
pub mod scrapers;
pub mod twitter;
pub mod utils;

pub use error::{RotationError, SigningError, TwitterError};
pub use oauth::OAuthCredentials;
pub use rotation::{RotationConfig, ScheduleEntry, Source};
pub use twitter::TwitterClient;
