//! News source scrapers.
//!
//! Sources are data, not code: each entry in the configuration names an
//! index page and two CSS selectors, and [`html`] handles all of them.
//!
//! # Common Patterns
//!
//! - `index_articles(source)`: returns article URLs from the index page
//! - `fetch_first_article(source, urls)`: returns the first article with
//!   content, skipping failures
//!
//! A run only needs one article, so fetching is sequential and stops at the
//! first success.

pub mod html;

pub use html::{fetch_article, fetch_first_article, index_articles};
