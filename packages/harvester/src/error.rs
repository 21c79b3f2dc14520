//! Error types for the harvester.
//!
//! `HarvesterError` is the single error type exposed to library consumers.
//! Per-statute failures (fetch, parse, image payloads) are represented here
//! too, but the bundle pipeline absorbs them into safe defaults instead of
//! propagating them.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid e-Gov law ID.
    #[error("Invalid law ID: '{0}'. Expected ASCII letters, digits or '_' (e.g., 325AC0000000201)")]
    InvalidLawId(String),

    /// Category name not present in the official category table.
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download a statute document.
    #[error("Failed to download statute {law_id}: {source}")]
    DocumentDownload {
        law_id: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to download a statute list.
    #[error("Failed to download statute list from {url}: {source}")]
    ListDownload {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body exceeds the configured size limit.
    #[error("Response too large: {size} bytes exceeds limit of {limit} bytes")]
    ResponseTooLarge { size: u64, limit: u64 },

    /// URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An embedded image payload could not be decoded.
    #[error("Invalid image payload: {0}")]
    ImagePayload(String),

    /// A persisted selection list could not be loaded.
    #[error("Failed to load selection list: {0}")]
    SelectionLoad(String),

    /// Nothing was selected for bundling.
    #[error("Selection is empty: add statutes with `select add` or pass labels")]
    EmptySelection,

    /// Writing the archive failed.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
