//! Signature base string construction and HMAC-SHA1 signing.
//!
//! The base string is
//!
//! ```text
//! METHOD & enc(normalized url) & enc(k1=v1&k2=v2&...)
//! ```
//!
//! where every key and value is percent-encoded first and the pairs are
//! sorted byte-wise by encoded key. The signing key is
//! `enc(consumer_secret)&enc(token_secret)`. The digest is base64 with the
//! standard alphabet and padding.

use super::OAuthCredentials;
use super::encode::percent_encode;
use crate::error::SigningError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use itertools::Itertools;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Value of `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Value of `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// The per-attempt `oauth_*` parameters, minus the signature itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParams {
    pub consumer_key: String,
    pub token: String,
    pub nonce: String,
    pub timestamp: String,
}

impl OAuthParams {
    /// Bind a nonce and timestamp to the public halves of `creds`.
    pub fn new(
        creds: &OAuthCredentials,
        nonce: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: creds.consumer_key().to_string(),
            token: creds.access_token().to_string(),
            nonce: nonce.into(),
            timestamp: timestamp.into(),
        }
    }

    /// The six signed `oauth_*` pairs.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", self.nonce.as_str()),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", self.timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ]
    }
}

/// Everything that feeds one signature.
///
/// `extra` holds non-oauth parameters that must be signed (query-string or
/// form parameters). JSON bodies contribute nothing, so publishing passes an
/// empty slice.
#[derive(Debug, Clone)]
pub struct SignatureRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    pub oauth: &'a OAuthParams,
    pub extra: &'a [(&'a str, &'a str)],
}

impl<'a> SignatureRequest<'a> {
    pub fn new(method: &'a str, url: &'a Url, oauth: &'a OAuthParams) -> Self {
        Self {
            method,
            url,
            oauth,
            extra: &[],
        }
    }

    pub fn with_extra(mut self, extra: &'a [(&'a str, &'a str)]) -> Self {
        self.extra = extra;
        self
    }

    /// Encoded `key=value` pairs sorted by encoded key, joined with `&`.
    pub fn parameter_string(&self) -> String {
        let mut encoded: Vec<(String, String)> = self
            .oauth
            .pairs()
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.extend(
            self.extra
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        );
        // String ordering is byte-wise, not locale-aware. Values break ties
        // between repeated extra keys.
        encoded.sort();
        encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .join("&")
    }

    /// The exact string that gets HMAC-signed.
    pub fn base_string(&self) -> String {
        format!(
            "{}&{}&{}",
            self.method.to_ascii_uppercase(),
            percent_encode(&base_string_uri(self.url)),
            percent_encode(&self.parameter_string())
        )
    }

    /// Compute the base64 HMAC-SHA1 signature with the secret halves of `creds`.
    pub fn sign(&self, creds: &OAuthCredentials) -> Result<String, SigningError> {
        hmac_sha1_base64(
            &signing_key(creds.consumer_secret(), creds.access_token_secret()),
            &self.base_string(),
        )
    }
}

/// Scheme, host, non-default port and path; query and fragment dropped.
///
/// `Url` already lowercases the scheme and host and omits default ports.
pub fn base_string_uri(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    normalized.to_string()
}

/// `enc(consumer_secret)&enc(token_secret)`.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

fn hmac_sha1_base64(key: &str, message: &str) -> Result<String, SigningError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| SigningError::InvalidKey)?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
