//! Bundle assembly: selection list in, ZIP archive out.
//!
//! Every selected statute is resolved, fetched, stripped of its images and
//! converted to Markdown before the next one starts. Failures of a single
//! statute are recorded and skipped; only archive write errors abort.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::catalog::StatuteCatalog;
use crate::config::{archive_file_name, today_stamp};
use crate::fetcher::{DocumentFetcher, RawDocument};
use crate::images::extract_images;
use crate::markdown;
use crate::selection::SelectionList;
use crate::types::{name_from_label, ConvertedDocument, ImageAsset, StatuteReference};

/// Receives progress updates while a bundle is assembled.
///
/// All methods default to doing nothing.
pub trait ProgressSink {
    /// Assembly of `total` selections begins.
    fn start(&mut self, _total: usize) {}

    /// Work on the statute called `name` begins.
    fn item(&mut self, _name: &str) {}

    /// A selection was skipped for a reason the user should see.
    fn warn(&mut self, _message: &str) {}

    /// `done` of `total` selections have been attempted.
    fn advance(&mut self, _done: usize, _total: usize) {}

    /// The archive is complete.
    fn finish(&mut self) {}
}

/// Progress sink that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Why a selection produced no document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The label is not in the loaded statute list.
    Unresolved,
    /// The statute document could not be downloaded.
    FetchFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved => write!(f, "not in the current statute list"),
            Self::FetchFailed => write!(f, "download failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub label: String,
    pub reason: SkipReason,
}

/// What ended up in the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    /// Markdown entries, in selection order.
    pub documents: Vec<String>,
    /// Image entries, in write order.
    pub images: Vec<String>,
    pub skipped: Vec<SkippedItem>,
    /// Entry names that were dropped because an entry of that name existed.
    pub duplicates: Vec<String>,
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Suggested file name (`法令データセット_{YYYYMMDD}.zip`).
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub report: BundleReport,
}

impl Bundle {
    /// Write the archive into `dir` under its suggested file name.
    pub fn save_to(&self, dir: &Path) -> crate::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// The output derived from one statute document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedStatute {
    pub document: ConvertedDocument,
    pub images: Vec<ImageAsset>,
}

/// Convert one fetched statute into its Markdown document and images.
pub fn process_statute(name: &str, raw: &RawDocument, date_stamp: &str) -> ProcessedStatute {
    let images = extract_images(&raw.bytes)
        .into_iter()
        .map(|(entry, bytes)| ImageAsset::new(&entry, bytes))
        .collect();

    let document = ConvertedDocument::new(name, date_stamp, markdown::convert(&raw.bytes));

    ProcessedStatute { document, images }
}

/// Builds bundle archives from selection lists.
pub struct BundleAssembler<'a, F: DocumentFetcher> {
    fetcher: &'a F,
    date_stamp: String,
}

impl<'a, F: DocumentFetcher> BundleAssembler<'a, F> {
    /// Create an assembler stamping files with today's date.
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            date_stamp: today_stamp(),
        }
    }

    /// Use a fixed `YYYYMMDD` stamp instead of today's date.
    pub fn with_date(mut self, date_stamp: impl Into<String>) -> Self {
        self.date_stamp = date_stamp.into();
        self
    }

    /// Assemble an archive for every label in `selection`, in order.
    ///
    /// Labels are resolved against `catalog`; unresolved labels produce a
    /// warning and are skipped, failed downloads are skipped silently. The
    /// archive always contains whatever succeeded, possibly nothing.
    pub fn assemble(
        &self,
        selection: &SelectionList,
        catalog: &StatuteCatalog,
        progress: &mut dyn ProgressSink,
    ) -> crate::Result<Bundle> {
        let total = selection.len();
        progress.start(total);

        let mut archive = ArchiveWriter::new();
        let mut report = BundleReport::default();

        for (index, label) in selection.iter().enumerate() {
            match catalog.resolve(label) {
                Some(reference) => {
                    progress.item(&reference.name);
                    self.add_statute(&mut archive, &mut report, label, reference)?;
                }
                None => {
                    let name = name_from_label(label);
                    tracing::warn!(label, "Selection not in current statute list, skipping");
                    progress.warn(&format!(
                        "Skipping 「{name}」: not in the current category (category すべて may include it)"
                    ));
                    report.skipped.push(SkippedItem {
                        label: label.to_string(),
                        reason: SkipReason::Unresolved,
                    });
                }
            }

            progress.advance(index + 1, total);
        }

        let bytes = archive.finish()?;
        progress.finish();

        tracing::info!(
            documents = report.documents.len(),
            images = report.images.len(),
            skipped = report.skipped.len(),
            "Bundle assembled"
        );

        Ok(Bundle {
            file_name: archive_file_name(&self.date_stamp),
            bytes,
            report,
        })
    }

    fn add_statute(
        &self,
        archive: &mut ArchiveWriter,
        report: &mut BundleReport,
        label: &str,
        reference: &StatuteReference,
    ) -> crate::Result<()> {
        let Some(raw) = self.fetcher.fetch(&reference.id) else {
            report.skipped.push(SkippedItem {
                label: label.to_string(),
                reason: SkipReason::FetchFailed,
            });
            return Ok(());
        };

        let processed = process_statute(&reference.name, &raw, &self.date_stamp);

        for image in &processed.images {
            if archive.add(&image.relative_path, &image.bytes)? {
                report.images.push(image.relative_path.clone());
            } else {
                report.duplicates.push(image.relative_path.clone());
            }
        }

        // Statutes sharing a title are told apart by law ID
        let mut document = processed.document;
        if archive.contains(&document.filename) {
            let name = format!("{}_{}", reference.name, reference.id);
            document = ConvertedDocument::new(&name, &self.date_stamp, document.text_body);
        }

        if archive.add(&document.filename, document.text_body.as_bytes())? {
            report.documents.push(document.filename);
        } else {
            report.duplicates.push(document.filename);
        }

        Ok(())
    }
}

/// In-memory deflate ZIP that refuses duplicate entry names.
struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
    options: SimpleFileOptions,
}

impl ArchiveWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Add an entry; returns `false` (and writes nothing) if the name is taken.
    fn add(&mut self, name: &str, data: &[u8]) -> crate::Result<bool> {
        if !self.names.insert(name.to_string()) {
            tracing::warn!(entry = name, "Duplicate archive entry, keeping the first");
            return Ok(false);
        }
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(data)?;
        Ok(true)
    }

    fn finish(self) -> crate::Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Read;
    use zip::ZipArchive;

    const STATUTE_XML: &str = "<Law><LawNum>令和六年法律第一号</LawNum><LawBody><LawTitle>テスト法</LawTitle>\
        <MainProvision><Article><ArticleTitle>第一条</ArticleTitle></Article></MainProvision></LawBody></Law>";

    struct MapFetcher(HashMap<&'static str, &'static str>);

    impl DocumentFetcher for MapFetcher {
        fn fetch(&self, law_id: &str) -> Option<RawDocument> {
            self.0.get(law_id).map(|xml| RawDocument {
                law_id: law_id.to_string(),
                bytes: xml.as_bytes().to_vec(),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        warnings: Vec<String>,
        advances: Vec<(usize, usize)>,
        finished: bool,
    }

    impl ProgressSink for Recorder {
        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }

        fn advance(&mut self, done: usize, total: usize) {
            self.advances.push((done, total));
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_unresolved_and_failed_are_skipped() {
        let fetcher = MapFetcher(HashMap::from([("A1", STATUTE_XML)]));
        let catalog = StatuteCatalog::new(vec![
            StatuteReference::new("テスト法", "A1"),
            StatuteReference::new("消えた法", "B2"),
        ]);
        let selection: SelectionList = ["テスト法", "別の法 【略: 別法】", "消えた法"]
            .into_iter()
            .collect();

        let mut recorder = Recorder::default();
        let bundle = BundleAssembler::new(&fetcher)
            .with_date("20260101")
            .assemble(&selection, &catalog, &mut recorder)
            .unwrap();

        assert_eq!(bundle.report.documents, vec!["テスト法_20260101.md"]);
        assert_eq!(
            bundle.report.skipped,
            vec![
                SkippedItem {
                    label: "別の法 【略: 別法】".to_string(),
                    reason: SkipReason::Unresolved
                },
                SkippedItem {
                    label: "消えた法".to_string(),
                    reason: SkipReason::FetchFailed
                },
            ]
        );
        assert_eq!(recorder.warnings.len(), 1);
        assert!(recorder.warnings[0].contains("別の法"));
        assert!(!recorder.warnings[0].contains("別法】"));
        assert_eq!(recorder.advances, vec![(1, 3), (2, 3), (3, 3)]);
        assert!(recorder.finished);
        assert_eq!(bundle.file_name, "法令データセット_20260101.zip");
        assert_eq!(entry_names(&bundle.bytes), vec!["テスト法_20260101.md"]);
    }

    #[test]
    fn test_document_content_written() {
        let fetcher = MapFetcher(HashMap::from([("A1", STATUTE_XML)]));
        let catalog = StatuteCatalog::new(vec![StatuteReference::new("テスト法", "A1")]);
        let selection: SelectionList = ["テスト法"].into_iter().collect();

        let bundle = BundleAssembler::new(&fetcher)
            .with_date("20260101")
            .assemble(&selection, &catalog, &mut NoProgress)
            .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let mut entry = archive.by_name("テスト法_20260101.md").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, "# テスト法\n令和六年法律第一号\n\n##  第一条\n");
    }

    #[test]
    fn test_empty_selection_gives_empty_archive() {
        let fetcher = MapFetcher(HashMap::new());
        let bundle = BundleAssembler::new(&fetcher)
            .assemble(&SelectionList::new(), &StatuteCatalog::default(), &mut NoProgress)
            .unwrap();
        assert!(entry_names(&bundle.bytes).is_empty());
        assert!(bundle.report.documents.is_empty());
    }

    #[test]
    fn test_unparsable_document_still_written_with_marker() {
        let fetcher = MapFetcher(HashMap::from([("X", "<Law>")]));
        let catalog = StatuteCatalog::new(vec![StatuteReference::new("壊れた法", "X")]);
        let selection: SelectionList = ["壊れた法"].into_iter().collect();

        let bundle = BundleAssembler::new(&fetcher)
            .with_date("20260101")
            .assemble(&selection, &catalog, &mut NoProgress)
            .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name("壊れた法_20260101.md")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "XML Parse Error");
    }

    #[test]
    fn test_statutes_sharing_a_title_both_written() {
        let fetcher = MapFetcher(HashMap::from([("A1", STATUTE_XML), ("B2", STATUTE_XML)]));
        let catalog = StatuteCatalog::new(vec![
            StatuteReference::new("同名法", "A1"),
            StatuteReference::new("同名法", "B2").with_abbreviation("別名"),
        ]);
        let selection: SelectionList = ["同名法", "同名法 【略: 別名】"].into_iter().collect();

        let bundle = BundleAssembler::new(&fetcher)
            .with_date("20260101")
            .assemble(&selection, &catalog, &mut NoProgress)
            .unwrap();

        assert_eq!(
            bundle.report.documents,
            vec!["同名法_20260101.md", "同名法_B2_20260101.md"]
        );
        assert!(bundle.report.duplicates.is_empty());
        assert_eq!(
            entry_names(&bundle.bytes),
            vec!["同名法_20260101.md", "同名法_B2_20260101.md"]
        );
    }

    #[test]
    fn test_duplicate_entry_names_keep_first() {
        let mut writer = ArchiveWriter::new();
        assert!(writer.add("images/a.jpg", b"first").unwrap());
        assert!(!writer.add("images/a.jpg", b"second").unwrap());
        let bytes = writer.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut data = Vec::new();
        archive
            .by_name("images/a.jpg")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"first");
    }

    #[test]
    fn test_bundle_save_to() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = Bundle {
            file_name: "法令データセット_20260101.zip".to_string(),
            bytes: vec![1, 2, 3],
            report: BundleReport::default(),
        };
        let path = bundle.save_to(dir.path()).unwrap();
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
