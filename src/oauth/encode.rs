//! RFC 3986 percent-encoding as OAuth 1.0a requires it.
//!
//! Only the unreserved set `A-Z a-z 0-9 - . _ ~` passes through. Everything
//! else, including `! ' ( ) *` which URI-component encoders commonly leave
//! alone, becomes `%XX` with uppercase hex over the UTF-8 bytes.

/// Percent-encode a string for use in a signature base string or an
/// `Authorization` header parameter.
///
/// # Examples
///
/// ```
/// use awful_news_tweets::oauth::percent_encode;
///
/// assert_eq!(percent_encode("a!b'c(d)e*f"), "a%21b%27c%28d%29e%2Af");
/// assert_eq!(percent_encode("abc123-._~"), "abc123-._~");
/// ```
pub fn percent_encode(input: &str) -> String {
    // `urlencoding` escapes every byte outside the unreserved set, which is
    // exactly the OAuth set.
    urlencoding::encode(input).into_owned()
}
