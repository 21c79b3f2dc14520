//! Hourei Harvester - Download Japanese statutes from the e-Gov registry.
//!
//! This crate fetches statute XML from the e-Gov law API, converts it to
//! Markdown, extracts embedded images, and packages a user's selection of
//! statutes into a single ZIP archive.
//!
//! # Example
//!
//! ```
//! use hourei_harvester::{markdown, selection::SelectionList};
//!
//! let xml = "<Law><LawNum>昭和二十五年法律第二百一号</LawNum>\
//!            <LawBody><LawTitle>建築基準法</LawTitle></LawBody></Law>";
//! assert!(markdown::convert(xml.as_bytes()).starts_with("# 建築基準法\n"));
//!
//! let mut selection = SelectionList::new();
//! assert!(selection.add("建築基準法"));
//! assert!(!selection.add("建築基準法"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Endpoints, limits and validation
//! - [`types`]: Statute references and archive entries
//! - [`error`]: Error types and Result alias
//! - [`http`]: Blocking HTTP client helpers
//! - [`xml`]: XML utilities
//! - [`statute`]: Typed statute tree
//! - [`markdown`]: Markdown rendering
//! - [`images`]: Embedded image extraction
//! - [`fetcher`]: Statute document retrieval
//! - [`catalog`]: Statute lists and categories
//! - [`selection`]: The user's selection list
//! - [`bundle`]: ZIP bundle assembly
//! - [`cli`]: Command-line interface

pub mod bundle;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod images;
pub mod markdown;
pub mod selection;
pub mod statute;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use bundle::{Bundle, BundleAssembler, BundleReport, NoProgress, ProgressSink};
pub use catalog::{load_catalog, CatalogSource, StatuteCatalog};
pub use config::{validate_law_id, HarvesterConfig};
pub use error::{HarvesterError, Result};
pub use fetcher::{DocumentFetcher, HttpFetcher, RawDocument};
pub use images::extract_images;
pub use selection::SelectionList;
pub use types::{ConvertedDocument, ImageAsset, StatuteReference};
