//! HTTP client wrapper for the e-Gov API.
//!
//! All requests are blocking and made exactly once: a failed request is
//! reported to the caller, which decides whether to skip or abort.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("hourei-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Arguments
/// * `timeout` - Total request timeout (connect + transfer)
///
/// # Returns
/// A `reqwest::blocking::Client` configured with the timeout and user agent.
pub fn create_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download the body of a URL, rejecting error statuses and oversized bodies.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to download from
/// * `max_size` - Maximum accepted body size in bytes
///
/// # Returns
/// Raw bytes of the response body
pub fn download_bytes(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>> {
    tracing::debug!(url, "GET");

    let response = client.get(url).send()?.error_for_status()?;

    // Reject early when the server announces the size
    if let Some(len) = response.content_length() {
        if len > max_size {
            return Err(HarvesterError::ResponseTooLarge {
                size: len,
                limit: max_size,
            });
        }
    }

    // Read at most one byte past the limit to detect oversized chunked bodies
    let mut bytes = Vec::new();
    response.take(max_size.saturating_add(1)).read_to_end(&mut bytes)?;

    let size = bytes.len() as u64;
    if size > max_size {
        return Err(HarvesterError::ResponseTooLarge {
            size,
            limit: max_size,
        });
    }

    Ok(bytes)
}

/// Convert bytes to a string, replacing invalid UTF-8 sequences.
///
/// Logs a warning naming `context` when replacement was necessary.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        std::borrow::Cow::Borrowed(s) => s.to_string(),
        std::borrow::Cow::Owned(s) => {
            tracing::warn!(context, "Invalid UTF-8 replaced with U+FFFD");
            s
        }
    }
}
