//! `Authorization: OAuth ...` header construction.

use super::OAuthCredentials;
use super::encode::percent_encode;
use super::signature::{OAuthParams, SignatureRequest};
use crate::error::SigningError;
use chrono::Utc;
use itertools::Itertools;
use rand::RngCore;
use std::fmt;
use url::Url;

/// Random bytes drawn per nonce (rendered as twice as many hex characters).
pub const NONCE_BYTES: usize = 32;

/// A rendered, single-use `Authorization` header value.
///
/// Valid for exactly one HTTP attempt. A retry must call
/// [`AuthorizationHeader::generate`] again to get a fresh nonce and
/// timestamp.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHeader(String);

impl AuthorizationHeader {
    /// Sign `method url` with a fresh nonce and the current Unix time.
    pub fn generate(
        creds: &OAuthCredentials,
        method: &str,
        url: &Url,
    ) -> Result<Self, SigningError> {
        Self::with_nonce(creds, method, url, &generate_nonce(), &timestamp_now())
    }

    /// Sign with a caller-supplied nonce and timestamp.
    pub fn with_nonce(
        creds: &OAuthCredentials,
        method: &str,
        url: &Url,
        nonce: &str,
        timestamp: &str,
    ) -> Result<Self, SigningError> {
        let params = OAuthParams::new(creds, nonce, timestamp);
        let signature = SignatureRequest::new(method, url, &params).sign(creds)?;

        let rendered = params
            .pairs()
            .iter()
            .copied()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .join(", ");

        Ok(Self(format!("OAuth {rendered}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// The header carries the consumer key and token; keep it out of logs.
impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationHeader(<redacted>)")
    }
}

/// 32 bytes from the thread-local CSPRNG, lowercase hex.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Current Unix time in whole seconds.
pub fn timestamp_now() -> String {
    Utc::now().timestamp().to_string()
}

/// Split an `OAuth k="v", ...` header into `(key, value)` pairs. Values stay
/// percent-encoded.
#[cfg(test)]
pub(crate) fn parse_header_params(header: &str) -> std::collections::BTreeMap<String, String> {
    header
        .trim_start_matches("OAuth ")
        .split(", ")
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((k.to_string(), v.trim_matches('"').to_string()))
        })
        .collect()
}
