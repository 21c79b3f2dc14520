//! Core data types shared across the harvester.

use serde::{Deserialize, Serialize};

use crate::config::{IMAGES_DIR, MARKDOWN_EXTENSION};

/// Separator between a statute name and its abbreviation in display labels.
pub const ABBREVIATION_SEPARATOR: &str = " 【";

/// A selectable statute from the registry list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteReference {
    /// Official statute title (e.g., "建築基準法").
    pub name: String,

    /// e-Gov law ID (e.g., "325AC0000000201").
    pub id: String,

    /// Label shown to the user and stored in selection lists. Either the
    /// name, or the name followed by ` 【略: {abbreviation}】`.
    pub display_label: String,

    /// Reading of the title in kana, used only for ordering category lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kana: Option<String>,
}

impl StatuteReference {
    /// Create a reference whose display label is its name.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_label: name.clone(),
            name,
            id: id.into(),
            kana: None,
        }
    }

    /// Append an abbreviation to the display label.
    ///
    /// # Examples
    /// ```
    /// use hourei_harvester::types::StatuteReference;
    ///
    /// let r = StatuteReference::new("特定商取引に関する法律", "351AC0000000057")
    ///     .with_abbreviation("特定商取引法");
    /// assert_eq!(r.display_label, "特定商取引に関する法律 【略: 特定商取引法】");
    /// ```
    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: &str) -> Self {
        if !abbreviation.is_empty() {
            self.display_label = format!("{}{ABBREVIATION_SEPARATOR}略: {abbreviation}】", self.name);
        }
        self
    }

    #[must_use]
    pub fn with_kana(mut self, kana: impl Into<String>) -> Self {
        self.kana = Some(kana.into());
        self
    }
}

/// Statute name contained in a display label (the label without its
/// abbreviation suffix).
///
/// # Examples
/// ```
/// use hourei_harvester::types::name_from_label;
///
/// assert_eq!(name_from_label("消費税法 【略: 消費税】"), "消費税法");
/// assert_eq!(name_from_label("民法"), "民法");
/// ```
pub fn name_from_label(label: &str) -> &str {
    label
        .split(ABBREVIATION_SEPARATOR)
        .next()
        .unwrap_or(label)
}

/// One statute converted to Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Archive entry name: `{statute name}_{YYYYMMDD}.md`.
    pub filename: String,
    pub text_body: String,
}

impl ConvertedDocument {
    #[must_use]
    pub fn new(statute_name: &str, date_stamp: &str, text_body: String) -> Self {
        Self {
            filename: format!("{statute_name}_{date_stamp}.{MARKDOWN_EXTENSION}"),
            text_body,
        }
    }
}

/// An image extracted from a statute document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Archive entry name: `images/{name}`.
    pub relative_path: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    #[must_use]
    pub fn new(entry_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            relative_path: format!("{IMAGES_DIR}/{entry_name}"),
            bytes,
        }
    }
}
