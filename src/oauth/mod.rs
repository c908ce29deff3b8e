//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! # Layout
//!
//! - [`encode`]: RFC 3986 percent-encoding with the OAuth escape set
//! - [`signature`]: signature base string and HMAC-SHA1 signature
//! - [`header`]: nonce/timestamp generation and the `Authorization` header
//!
//! The call chain for one request is
//! [`AuthorizationHeader::generate`] → [`SignatureRequest::sign`] →
//! [`percent_encode`]. Nothing here holds state between calls; every
//! signing attempt draws its own nonce and timestamp.

pub mod encode;
pub mod header;
pub mod signature;

pub use encode::percent_encode;
pub use header::{AuthorizationHeader, generate_nonce, timestamp_now};
pub use signature::{OAUTH_VERSION, OAuthParams, SIGNATURE_METHOD, SignatureRequest};

use crate::error::SigningError;
use std::fmt;

/// The four secrets of an OAuth 1.0a user-context grant.
///
/// Construction rejects blank fields so a request is never signed with an
/// empty secret. `Debug` output redacts every field.
#[derive(Clone)]
pub struct OAuthCredentials {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl OAuthCredentials {
    /// Build a credentials bundle, failing fast on any blank field.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Result<Self, SigningError> {
        let creds = Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        };
        for (field, value) in [
            ("consumer_key", &creds.consumer_key),
            ("consumer_secret", &creds.consumer_secret),
            ("access_token", &creds.access_token),
            ("access_token_secret", &creds.access_token_secret),
        ] {
            if value.trim().is_empty() {
                return Err(SigningError::MissingCredential(field));
            }
        }
        Ok(creds)
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn access_token_secret(&self) -> &str {
        &self.access_token_secret
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}
