//! Typed tree of an e-Gov statute document.
//!
//! The registry XML nests `Law` → `LawBody` → `MainProvision` → (`Part` /
//! `Chapter` / `Section` …) → `Article` → `Paragraph` → `Item` → `Subitem1`,
//! with `AppdxTable` elements appended after the main provision. Only the
//! parts needed for Markdown output are modelled here. Optional text fields
//! are `None` when the element is missing or has no direct text; accessors
//! supply the rendering defaults.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node};

use crate::error::Result;
use crate::http::bytes_to_string;
use crate::xml::{
    collect_text, element_children, find_child, find_children, find_descendant, own_text,
    parse_document,
};

/// Marker used for an item without an `ItemTitle`.
pub const DEFAULT_ITEM_MARKER: &str = "・";

/// Heading used for an appendix table without an `AppdxTableTitle`.
pub const DEFAULT_APPENDIX_TITLE: &str = "別表";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A parsed statute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statute {
    pub title: String,
    pub number: String,
    pub body: StatuteBody,
    pub appendix_tables: Vec<AppendixTable>,
}

/// The provisions of a statute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatuteBody {
    /// Every `Article` in the document, in document order.
    Articles(Vec<Article>),

    /// Older documents without articles: the `Paragraph` children of the
    /// main provision stand in for articles.
    MainProvisionParagraphs(Vec<Paragraph>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub caption: Option<String>,
    pub title: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub num: Option<String>,
    pub sentence: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub title: Option<String>,
    pub sentence: String,
    pub subitems: Vec<Subitem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subitem {
    pub title: Option<String>,
    pub sentence: String,
}

/// An appendix table (`AppdxTable`), kept as flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixTable {
    pub title: Option<String>,
    /// All text of the table with whitespace runs collapsed to one space.
    pub content: String,
}

impl Statute {
    /// Parse a statute from raw document bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = bytes_to_string(bytes, "statute document");
        Self::parse(&text)
    }

    /// Parse a statute from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = parse_document(xml)?;
        Ok(Self::from_document(&doc))
    }

    /// Build the typed tree from a parsed document. Never fails: missing
    /// elements become empty values.
    pub fn from_document(doc: &Document<'_>) -> Self {
        let root = doc.root_element();

        let title = first_text(root, "LawTitle");
        let number = first_text(root, "LawNum");

        let articles: Vec<Article> = descendants_or_self(root, "Article")
            .map(Article::from_node)
            .collect();

        let body = if articles.is_empty() {
            StatuteBody::MainProvisionParagraphs(main_provision_paragraphs(root))
        } else {
            StatuteBody::Articles(articles)
        };

        let appendix_tables = descendants_or_self(root, "AppdxTable")
            .map(AppendixTable::from_node)
            .collect();

        Self {
            title,
            number,
            body,
            appendix_tables,
        }
    }

    /// Number of article-equivalent units in the body.
    pub fn unit_count(&self) -> usize {
        match &self.body {
            StatuteBody::Articles(articles) => articles.len(),
            StatuteBody::MainProvisionParagraphs(paragraphs) => paragraphs.len(),
        }
    }
}

impl Article {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            caption: child_text(node, "ArticleCaption"),
            title: child_text(node, "ArticleTitle"),
            paragraphs: find_children(node, "Paragraph")
                .map(Paragraph::from_node)
                .collect(),
        }
    }

    pub fn caption(&self) -> &str {
        self.caption.as_deref().unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

impl Paragraph {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            num: child_text(node, "ParagraphNum"),
            sentence: sentence_text(node),
            items: find_children(node, "Item").map(Item::from_node).collect(),
        }
    }

    pub fn num(&self) -> &str {
        self.num.as_deref().unwrap_or_default()
    }
}

impl Item {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            title: child_text(node, "ItemTitle"),
            sentence: sentence_text(node),
            subitems: find_children(node, "Subitem1")
                .map(Subitem::from_node)
                .collect(),
        }
    }

    /// Item marker: the `ItemTitle`, or `・` when there is none.
    pub fn marker(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_ITEM_MARKER)
    }
}

impl Subitem {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            title: child_text(node, "Subitem1Title"),
            sentence: sentence_text(node),
        }
    }

    pub fn marker(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

impl AppendixTable {
    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            title: child_text(node, "AppdxTableTitle"),
            content: collapse_whitespace(&collect_text(node)),
        }
    }

    /// Heading text: the `AppdxTableTitle`, or `別表` when there is none.
    pub fn heading(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_APPENDIX_TITLE)
    }

    /// The first `max_chars` characters of the flattened content.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.content[..byte_idx],
            None => &self.content,
        }
    }
}

/// Collapse every whitespace run (including U+3000) to one space and trim.
///
/// # Examples
/// ```
/// use hourei_harvester::statute::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  別表\n\t第一　一  "), "別表 第一 一");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// `node` itself followed by its matching descendants, in document order.
fn descendants_or_self<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Direct text of the first element named `tag` in the document.
fn first_text(root: Node<'_, '_>, tag: &str) -> String {
    descendants_or_self(root, tag)
        .next()
        .map(own_text)
        .unwrap_or_default()
}

/// Direct text of the first child named `tag`, `None` if missing or empty.
fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag)
        .map(own_text)
        .filter(|text| !text.is_empty())
}

/// Full text of the first `Sentence` below `node`.
fn sentence_text(node: Node<'_, '_>) -> String {
    find_descendant(node, "Sentence")
        .map(collect_text)
        .unwrap_or_default()
}

/// `Paragraph` children of the first `MainProvision`, if it has any content.
fn main_provision_paragraphs(root: Node<'_, '_>) -> Vec<Paragraph> {
    let Some(main_provision) = descendants_or_self(root, "MainProvision").next() else {
        return Vec::new();
    };

    if element_children(main_provision).next().is_none() {
        return Vec::new();
    }

    find_children(main_provision, "Paragraph")
        .map(Paragraph::from_node)
        .collect()
}
