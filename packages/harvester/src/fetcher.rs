//! Statute document retrieval.
//!
//! Statute documents are the full XML of one law as served by
//! `/api/1/lawdata/{law_id}`, including any embedded image payloads.

use reqwest::blocking::Client;

use crate::config::{validate_law_id, HarvesterConfig};
use crate::error::{HarvesterError, Result};
use crate::http::{create_client, download_bytes};

/// Raw bytes of one statute document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub law_id: String,
    pub bytes: Vec<u8>,
}

/// Source of statute documents.
///
/// `fetch` returns `None` for any failure; the caller treats that as
/// "skip this statute".
pub trait DocumentFetcher {
    fn fetch(&self, law_id: &str) -> Option<RawDocument>;
}

/// Fetches statute documents from the e-Gov API.
pub struct HttpFetcher {
    client: Client,
    config: HarvesterConfig,
}

impl HttpFetcher {
    /// Create a fetcher with a client using the document timeout.
    pub fn new(config: HarvesterConfig) -> Result<Self> {
        let client = create_client(config.document_timeout)?;
        Ok(Self { client, config })
    }

    /// Fetch a statute document, reporting the failure kind.
    ///
    /// A single request is made; there are no retries.
    pub fn try_fetch(&self, law_id: &str) -> Result<RawDocument> {
        validate_law_id(law_id)?;

        let url = self.config.law_data_url(law_id);
        let bytes = download_bytes(&self.client, &url, self.config.max_response_size).map_err(
            |e| match e {
                HarvesterError::Http(source) => HarvesterError::DocumentDownload {
                    law_id: law_id.to_string(),
                    source,
                },
                other => other,
            },
        )?;

        tracing::debug!(law_id, size = bytes.len(), "Fetched statute document");

        Ok(RawDocument {
            law_id: law_id.to_string(),
            bytes,
        })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, law_id: &str) -> Option<RawDocument> {
        match self.try_fetch(law_id) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(law_id, error = %e, "Statute fetch failed");
                None
            }
        }
    }
}
