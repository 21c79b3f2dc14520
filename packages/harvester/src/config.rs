//! Configuration constants and validation functions for the harvester.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{HarvesterError, Result};

/// Base URL of the e-Gov law API.
pub const EGOV_API_BASE_URL: &str = "https://laws.e-gov.go.jp/api";

/// Path of the full statute list (XML, API v1).
pub const LIST_V1_PATH: &str = "/1/lawlists/1";

/// Path of the category-filtered statute list (JSON, API v2).
pub const LIST_V2_PATH: &str = "/2/laws";

/// Path prefix of a single statute document (XML, API v1).
pub const LAW_DATA_PATH: &str = "/1/lawdata";

/// Timeout for list retrieval in seconds.
///
/// The full list is several megabytes and the API is slow to produce it.
pub const LIST_TIMEOUT_SECS: u64 = 60;

/// Timeout for a single statute document in seconds.
pub const DOCUMENT_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (100 MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of statutes requested per category.
pub const CATEGORY_LIST_LIMIT: u32 = 1000;

/// Marker written instead of a document body when the XML cannot be parsed.
pub const XML_PARSE_ERROR_MARKER: &str = "XML Parse Error";

/// File extension of converted documents.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Directory inside the archive that holds extracted images.
pub const IMAGES_DIR: &str = "images";

/// Prefix of the suggested archive file name.
pub const ARCHIVE_NAME_PREFIX: &str = "法令データセット";

/// Default file name for a persisted selection list.
pub const DEFAULT_SELECTION_FILE: &str = "my_law_set.json";

/// e-Gov law IDs consist of ASCII letters, digits and underscores
/// (e.g. `325AC0000000201`).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LAW_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

/// Runtime configuration for talking to the e-Gov API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvesterConfig {
    pub api_base_url: String,
    pub list_timeout: Duration,
    pub document_timeout: Duration,
    pub max_response_size: u64,
    pub category_limit: u32,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            api_base_url: EGOV_API_BASE_URL.to_string(),
            list_timeout: Duration::from_secs(LIST_TIMEOUT_SECS),
            document_timeout: Duration::from_secs(DOCUMENT_TIMEOUT_SECS),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            category_limit: CATEGORY_LIST_LIMIT,
        }
    }
}

impl HarvesterConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Recognised variables:
    /// - `HOUREI_API_BASE_URL`
    /// - `HOUREI_LIST_TIMEOUT_SECS`
    /// - `HOUREI_DOCUMENT_TIMEOUT_SECS`
    /// - `HOUREI_MAX_RESPONSE_MB`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url =
            std::env::var("HOUREI_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let list_timeout = std::env::var("HOUREI_LIST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.list_timeout);

        let document_timeout = std::env::var("HOUREI_DOCUMENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.document_timeout);

        let max_response_size = std::env::var("HOUREI_MAX_RESPONSE_MB")
            .ok()
            .and_then(|v| megabytes_to_bytes(&v))
            .unwrap_or(defaults.max_response_size);

        Self {
            api_base_url,
            list_timeout,
            document_timeout,
            max_response_size,
            category_limit: defaults.category_limit,
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    pub fn with_max_response_size(mut self, bytes: u64) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// URL of the full statute list.
    pub fn list_v1_url(&self) -> String {
        format!("{}{LIST_V1_PATH}", self.base())
    }

    /// URL of the category-filtered statute list (without query string).
    pub fn list_v2_url(&self) -> String {
        format!("{}{LIST_V2_PATH}", self.base())
    }

    /// URL of a single statute document.
    ///
    /// # Examples
    /// ```
    /// use hourei_harvester::config::HarvesterConfig;
    ///
    /// let config = HarvesterConfig::default();
    /// assert_eq!(
    ///     config.law_data_url("325AC0000000201"),
    ///     "https://laws.e-gov.go.jp/api/1/lawdata/325AC0000000201"
    /// );
    /// ```
    pub fn law_data_url(&self, law_id: &str) -> String {
        format!("{}{LAW_DATA_PATH}/{law_id}", self.base())
    }

    fn base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

/// Parse a size in megabytes; `None` when unparsable or too large for `u64` bytes.
fn megabytes_to_bytes(value: &str) -> Option<u64> {
    value.parse::<u64>().ok()?.checked_mul(1024 * 1024)
}

/// Validate an e-Gov law ID.
///
/// # Examples
/// ```
/// use hourei_harvester::config::validate_law_id;
///
/// assert!(validate_law_id("325AC0000000201").is_ok());
/// assert!(validate_law_id("").is_err());
/// assert!(validate_law_id("../etc").is_err());
/// ```
pub fn validate_law_id(law_id: &str) -> Result<()> {
    if LAW_ID_PATTERN.is_match(law_id) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidLawId(law_id.to_string()))
    }
}

/// Today's date as `YYYYMMDD`, used to stamp output file names.
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Suggested file name for a bundle archive created on `date_stamp`.
///
/// # Examples
/// ```
/// use hourei_harvester::config::archive_file_name;
///
/// assert_eq!(archive_file_name("20260101"), "法令データセット_20260101.zip");
/// ```
pub fn archive_file_name(date_stamp: &str) -> String {
    format!("{ARCHIVE_NAME_PREFIX}_{date_stamp}.zip")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_law_id_valid() {
        assert!(validate_law_id("325AC0000000201").is_ok());
        assert!(validate_law_id("129AC0000000089").is_ok());
        assert!(validate_law_id("405AC0000000088_20240401_506AC0000000020").is_ok());
    }

    #[test]
    fn test_validate_law_id_invalid() {
        assert!(validate_law_id("").is_err());
        assert!(validate_law_id("325AC 0000000201").is_err());
        assert!(validate_law_id("325AC/0000000201").is_err());
        assert!(validate_law_id("建築基準法").is_err());
    }

    #[test]
    fn test_default_urls() {
        let config = HarvesterConfig::default();
        assert_eq!(config.list_v1_url(), "https://laws.e-gov.go.jp/api/1/lawlists/1");
        assert_eq!(config.list_v2_url(), "https://laws.e-gov.go.jp/api/2/laws");
        assert_eq!(
            config.law_data_url("325AC0000000201"),
            "https://laws.e-gov.go.jp/api/1/lawdata/325AC0000000201"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = HarvesterConfig::default().with_api_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            config.law_data_url("X"),
            "http://127.0.0.1:8080/1/lawdata/X"
        );
    }

    #[test]
    fn test_default_timeouts() {
        let config = HarvesterConfig::default();
        assert_eq!(config.list_timeout, Duration::from_secs(60));
        assert_eq!(config.document_timeout, Duration::from_secs(30));
        assert_eq!(config.category_limit, 1000);
    }

    #[test]
    fn test_today_stamp_format() {
        let stamp = today_stamp();
        assert_eq!(stamp.len(), 8);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_megabytes_to_bytes() {
        assert_eq!(megabytes_to_bytes("100"), Some(DEFAULT_MAX_RESPONSE_SIZE));
        assert_eq!(megabytes_to_bytes("0"), Some(0));
        assert_eq!(megabytes_to_bytes("abc"), None);
        assert_eq!(megabytes_to_bytes(&u64::MAX.to_string()), None);
        assert_eq!(megabytes_to_bytes("17592186044416"), None);
        assert_eq!(megabytes_to_bytes("17592186044415"), Some(17592186044415 * 1024 * 1024));
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("20261016"), "法令データセット_20261016.zip");
    }
}
