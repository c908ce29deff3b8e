//! Typed errors for the rotation selector, the OAuth signer, and the
//! X/Twitter client.
//!
//! The pipeline glue (scrapers, LLM calls, outputs) keeps using
//! `Box<dyn Error>`; these types exist where callers need to tell failure
//! kinds apart.

use thiserror::Error;

/// Errors raised while building a [`RotationConfig`](crate::rotation::RotationConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// The source list was empty.
    #[error("rotation requires at least one source")]
    NoSources,

    /// `interval_hours` was zero.
    #[error("rotation interval must be at least one hour")]
    ZeroInterval,

    /// Two sources share a name.
    #[error("duplicate source name in rotation: {0}")]
    DuplicateSource(String),
}

/// Errors raised while signing a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// A credential field was missing or blank.
    #[error("missing OAuth credential: {0}")]
    MissingCredential(&'static str),

    /// The HMAC key could not be initialized.
    #[error("invalid HMAC signing key")]
    InvalidKey,
}

/// Errors raised by [`TwitterClient`](crate::twitter::TwitterClient).
#[derive(Error, Debug)]
pub enum TwitterError {
    /// The text was rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request could not be signed.
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// The API answered with a non-2xx status.
    #[error("publish failed with status {status}: {body}")]
    Publish { status: u16, body: String },

    /// The API could not be reached.
    #[error("connectivity error: {0}")]
    Connectivity(#[from] reqwest::Error),

    /// A 2xx response did not carry a post id.
    #[error("unexpected response body: {body}")]
    UnexpectedResponse { body: String },
}

impl TwitterError {
    /// HTTP status attached to the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Publish { status, .. } => Some(*status),
            Self::Connectivity(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` when the platform rejected the credentials or signature.
    ///
    /// Only `401` counts. X also answers `403` for content-policy
    /// rejections (duplicates, blocked text), which re-signing cannot fix.
    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(401)
    }
}
