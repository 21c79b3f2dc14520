//! End-to-end tests for the conversion and bundling pipeline.
//!
//! Uses a fixture statute (テスト法) with two articles, an appendix table
//! and an embedded image archive. No network access.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use hourei_harvester::bundle::{BundleAssembler, ProgressSink, SkipReason};
use hourei_harvester::catalog::{parse_law_list_xml, StatuteCatalog};
use hourei_harvester::fetcher::{DocumentFetcher, RawDocument};
use hourei_harvester::images::extract_images;
use hourei_harvester::markdown::convert;
use hourei_harvester::selection::SelectionList;
use hourei_harvester::statute::{Statute, StatuteBody};
use pretty_assertions::assert_eq;
use zip::ZipArchive;

/// Load fixture file content.
fn load_fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Serves fixture documents by law ID.
struct FixtureFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl FixtureFetcher {
    fn new(entries: &[(&str, &str)]) -> Self {
        let documents = entries
            .iter()
            .map(|(id, fixture)| (id.to_string(), load_fixture(fixture)))
            .collect();
        Self { documents }
    }
}

impl DocumentFetcher for FixtureFetcher {
    fn fetch(&self, law_id: &str) -> Option<RawDocument> {
        self.documents.get(law_id).map(|bytes| RawDocument {
            law_id: law_id.to_string(),
            bytes: bytes.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingProgress {
    items: Vec<String>,
    warnings: Vec<String>,
    last: Option<(usize, usize)>,
}

impl ProgressSink for RecordingProgress {
    fn item(&mut self, name: &str) {
        self.items.push(name.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn advance(&mut self, done: usize, total: usize) {
        self.last = Some((done, total));
    }
}

fn fixture_catalog() -> StatuteCatalog {
    let xml = String::from_utf8(load_fixture("law_list.xml")).unwrap();
    StatuteCatalog::new(parse_law_list_xml(&xml).unwrap())
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut data = Vec::new();
    archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("missing entry {name}: {e}"))
        .read_to_end(&mut data)
        .unwrap();
    data
}

// =============================================================================
// Conversion
// =============================================================================

#[test]
fn test_convert_fixture_prefix() {
    let markdown = convert(&load_fixture("test_law.xml"));

    assert!(
        markdown.starts_with(
            "# テスト法\n令和六年法律第一号\n\n## 第一章 総則\n### １\nこの法律は、テストを目的とする。\n\n"
        ),
        "unexpected prefix:\n{markdown}"
    );
}

#[test]
fn test_convert_fixture_items() {
    let markdown = convert(&load_fixture("test_law.xml"));

    assert!(markdown.contains(
        "## （定義） 第二条\n### \nこの法律において、次の各号に掲げる用語の意義は、当該各号に定めるところによる。\n\n\
         - **一** 試験　別表第一に掲げるものをいう。\n    - **イ** 筆記試験\n- **二** 図面　別図に示すものをいう。\n"
    ));
}

#[test]
fn test_article_headings_in_order() {
    let bytes = load_fixture("test_law.xml");
    let markdown = convert(&bytes);

    let headings: Vec<&str> = markdown
        .lines()
        .filter(|line| line.starts_with("## "))
        .collect();
    assert_eq!(headings, vec!["## 第一章 総則", "## （定義） 第二条", "## 別表第一"]);

    let statute = Statute::from_bytes(&bytes).unwrap();
    let StatuteBody::Articles(articles) = &statute.body else {
        panic!("fixture has articles");
    };
    assert_eq!(articles.len(), 2);
    assert_eq!(headings.len(), articles.len() + statute.appendix_tables.len());
}

#[test]
fn test_conversion_is_deterministic() {
    let bytes = load_fixture("test_law.xml");
    assert_eq!(convert(&bytes), convert(&bytes));
}

#[test]
fn test_appendix_excerpt_is_truncated() {
    let markdown = convert(&load_fixture("test_law.xml"));

    let quote = markdown
        .lines()
        .find(|line| line.starts_with("> "))
        .expect("appendix blockquote");
    let body = quote.strip_prefix("> ").unwrap();
    let excerpt = body.strip_suffix("...").expect("ellipsis");

    assert_eq!(excerpt.chars().count(), 1000);
    assert!(excerpt.starts_with("別表第一 区分000金額は0円とする区分001"));
    assert!(markdown.contains("\n## 別表第一\n(表データが含まれます)\n> "));
}

// =============================================================================
// Images
// =============================================================================

#[test]
fn test_extract_fixture_images() {
    let images = extract_images(&load_fixture("test_law.xml"));

    let names: Vec<&str> = images.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["pict/H001.jpg", "pict/H002.png"]);
    assert!(images["pict/H001.jpg"].starts_with(&[0xff, 0xd8]));
    assert!(images["pict/H002.png"].starts_with(b"\x89PNG"));
}

#[test]
fn test_document_without_payloads_has_no_images() {
    let xml = "<Law><LawNum>一</LawNum><LawBody><LawTitle>法</LawTitle></LawBody></Law>";
    assert!(extract_images(xml.as_bytes()).is_empty());
}

// =============================================================================
// Bundling
// =============================================================================

#[test]
fn test_bundle_with_unresolved_selection() {
    let fetcher = FixtureFetcher::new(&[("506AC0000000001", "test_law.xml")]);
    let catalog = fixture_catalog();
    let selection: SelectionList = ["テスト法", "存在しない法 【略: 無法】"].into_iter().collect();

    let mut progress = RecordingProgress::default();
    let bundle = BundleAssembler::new(&fetcher)
        .with_date("20260401")
        .assemble(&selection, &catalog, &mut progress)
        .unwrap();

    assert_eq!(bundle.file_name, "法令データセット_20260401.zip");
    assert_eq!(bundle.report.documents, vec!["テスト法_20260401.md"]);
    assert_eq!(bundle.report.images, vec!["images/pict/H001.jpg", "images/pict/H002.png"]);
    assert_eq!(bundle.report.skipped.len(), 1);
    assert_eq!(bundle.report.skipped[0].reason, SkipReason::Unresolved);

    assert_eq!(progress.items, vec!["テスト法"]);
    assert_eq!(progress.warnings.len(), 1);
    assert!(progress.warnings[0].contains("存在しない法"));
    assert_eq!(progress.last, Some((2, 2)));

    let mut archive = ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    let markdown = String::from_utf8(read_entry(&mut archive, "テスト法_20260401.md")).unwrap();
    assert!(markdown.starts_with("# テスト法\n"));
    assert!(read_entry(&mut archive, "images/pict/H001.jpg").starts_with(&[0xff, 0xd8]));
}

#[test]
fn test_bundle_counts_only_successful_documents() {
    // 民法 resolves but has no document; 建築基準法 is served from the fixture
    let fetcher = FixtureFetcher::new(&[
        ("506AC0000000001", "test_law.xml"),
        ("325AC0000000201", "test_law.xml"),
    ]);
    let catalog = fixture_catalog();
    let selection: SelectionList = ["建築基準法", "民法", "未登録法", "テスト法"]
        .into_iter()
        .collect();

    let bundle = BundleAssembler::new(&fetcher)
        .with_date("20260401")
        .assemble(&selection, &catalog, &mut RecordingProgress::default())
        .unwrap();

    assert_eq!(
        bundle.report.documents,
        vec!["建築基準法_20260401.md", "テスト法_20260401.md"]
    );
    let reasons: Vec<SkipReason> = bundle.report.skipped.iter().map(|s| s.reason).collect();
    assert_eq!(reasons, vec![SkipReason::FetchFailed, SkipReason::Unresolved]);

    // Both documents carry the same images; the second copies are dropped
    assert_eq!(bundle.report.images.len(), 2);
    assert_eq!(
        bundle.report.duplicates,
        vec!["images/pict/H001.jpg", "images/pict/H002.png"]
    );

    let archive = ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    let markdown_entries = archive.file_names().filter(|n| n.ends_with(".md")).count();
    assert_eq!(markdown_entries, 2);
}

#[test]
fn test_selection_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my_law_set.json");

    let selection: SelectionList = ["テスト法", "建築士法 【略: 士法】", "民法"].into_iter().collect();
    selection.save_file(&path).unwrap();

    let mut loaded = SelectionList::new();
    loaded.load_file(&path).unwrap();
    assert_eq!(loaded, selection);
    assert_eq!(
        loaded.iter().collect::<Vec<_>>(),
        vec!["テスト法", "建築士法 【略: 士法】", "民法"]
    );
}
