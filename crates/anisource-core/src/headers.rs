//! Outbound header sets
//!
//! The referer/origin values here are part of the wire contract with the
//! source sites: their hotlink checks reject requests that do not carry them.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
};

use crate::error::{AnisourceError, Result};

/// Origin expected by the stream host when fetching a manifest
pub const KWIK_ORIGIN: &str = "https://kwik.cx";

/// Referer expected by the stream host when fetching a manifest
pub const KWIK_REFERER: &str = "https://kwik.cx/";

/// Builds the default header set, overlaid with `extra`
///
/// # Errors
/// Returns `InvalidInput` if an extra value is not a valid header value
pub fn request_headers(extra: &[(HeaderName, &str)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, text/html, */*; q=0.01"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    for (name, value) in extra {
        let value = HeaderValue::from_str(value).map_err(|_| {
            AnisourceError::InvalidInput(format!("Invalid value for header {}: {:?}", name, value))
        })?;
        headers.insert(name.clone(), value);
    }

    Ok(headers)
}

/// Default headers with the given referer
pub fn referer_headers(referer: &str) -> Result<HeaderMap> {
    request_headers(&[(REFERER, referer)])
}

/// Headers for the manifest fetch against the reconstructed stream host
pub fn stream_host_headers() -> Result<HeaderMap> {
    request_headers(&[(ORIGIN, KWIK_ORIGIN), (REFERER, KWIK_REFERER)])
}
