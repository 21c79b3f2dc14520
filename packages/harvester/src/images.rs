//! Extraction of images embedded in statute documents.
//!
//! The registry ships figures as `ImageData` elements whose text is a
//! base64-encoded ZIP archive holding one or more image files.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use roxmltree::Node;
use zip::ZipArchive;

use crate::error::{HarvesterError, Result};
use crate::http::bytes_to_string;
use crate::xml::{parse_document, tag_contains};

/// Tag fragment identifying image payload carriers.
const IMAGE_PAYLOAD_TAG: &str = "ImageData";

/// Extract all embedded images from a statute document.
///
/// Returns a map from file name (as stored in the embedded archive) to file
/// bytes. A payload that cannot be decoded is skipped; a document that cannot
/// be parsed yields an empty map.
pub fn extract_images(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut images = BTreeMap::new();

    let text = bytes_to_string(bytes, "statute document");
    let doc = match parse_document(&text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping image extraction for unparsable document");
            return images;
        }
    };

    for node in doc
        .descendants()
        .filter(|n| tag_contains(*n, IMAGE_PAYLOAD_TAG))
    {
        if let Err(e) = unpack_payload(node, &mut images) {
            tracing::debug!(error = %e, "Skipping image payload");
        }
    }

    images
}

/// Decode one payload node and add its entries to `images`.
fn unpack_payload(node: Node<'_, '_>, images: &mut BTreeMap<String, Vec<u8>>) -> Result<()> {
    let Some(encoded) = node.text() else {
        return Ok(());
    };

    let archive_bytes = decode_base64(encoded)?;
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| HarvesterError::ImagePayload(format!("not a ZIP archive: {e}")))?;

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping unreadable image entry");
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let mut data = Vec::new();
        match entry.read_to_end(&mut data) {
            Ok(_) => {
                images.insert(name, data);
            }
            Err(e) => {
                tracing::debug!(entry = %name, error = %e, "Skipping corrupt image entry");
            }
        }
    }

    Ok(())
}

/// Decode base64 text, ignoring embedded whitespace and line breaks.
fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(HarvesterError::ImagePayload("empty payload".to_string()));
    }

    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| HarvesterError::ImagePayload(format!("invalid base64: {e}")))
}
