//! Markdown rendering of statutes.
//!
//! Layout:
//!
//! ```text
//! # {LawTitle}
//! {LawNum}
//!
//! ## {ArticleCaption} {ArticleTitle}
//! ### {ParagraphNum}
//! {sentence}
//!
//! - **{ItemTitle}** {sentence}
//!     - **{Subitem1Title}** {sentence}
//!
//! ## {AppdxTableTitle}
//! (表データが含まれます)
//! > {flattened table text}...
//! ```

use crate::config::XML_PARSE_ERROR_MARKER;
use crate::statute::{Article, Paragraph, Statute, StatuteBody};

/// Note emitted under every appendix heading; tables are not rendered
/// structurally.
pub const APPENDIX_TABLE_NOTE: &str = "(表データが含まれます)";

/// Number of characters of an appendix table kept in the blockquote.
pub const APPENDIX_EXCERPT_CHARS: usize = 1000;

/// Marker appended to every appendix excerpt.
pub const ELLIPSIS: &str = "...";

/// Convert raw statute XML to Markdown.
///
/// Never fails: a document that cannot be parsed is rendered as the fixed
/// `XML Parse Error` marker.
///
/// # Examples
/// ```
/// use hourei_harvester::markdown::convert;
///
/// let xml = "<Law><LawNum>令和六年法律第一号</LawNum><LawBody><LawTitle>テスト法</LawTitle></LawBody></Law>";
/// assert!(convert(xml.as_bytes()).starts_with("# テスト法\n令和六年法律第一号\n\n"));
/// assert_eq!(convert(b"<Law>"), "XML Parse Error");
/// ```
pub fn convert(bytes: &[u8]) -> String {
    match Statute::from_bytes(bytes) {
        Ok(statute) => render(&statute),
        Err(e) => {
            tracing::warn!(error = %e, "Statute XML could not be parsed");
            XML_PARSE_ERROR_MARKER.to_string()
        }
    }
}

/// Render a parsed statute as Markdown.
pub fn render(statute: &Statute) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n{}\n\n", statute.title, statute.number));

    match &statute.body {
        StatuteBody::Articles(articles) => {
            for article in articles {
                render_article(&mut out, article);
            }
        }
        StatuteBody::MainProvisionParagraphs(paragraphs) => {
            // Items are not rendered for article-less documents
            for paragraph in paragraphs {
                render_paragraph_heading(&mut out, paragraph);
            }
        }
    }

    for table in &statute.appendix_tables {
        out.push_str(&format!(
            "\n## {}\n{APPENDIX_TABLE_NOTE}\n> {}{ELLIPSIS}\n\n",
            table.heading(),
            table.excerpt(APPENDIX_EXCERPT_CHARS)
        ));
    }

    out
}

fn render_article(out: &mut String, article: &Article) {
    out.push_str(&format!("## {} {}\n", article.caption(), article.title()));

    for paragraph in &article.paragraphs {
        render_paragraph_heading(out, paragraph);

        for item in &paragraph.items {
            out.push_str(&format!("- **{}** {}\n", item.marker(), item.sentence));

            for subitem in &item.subitems {
                out.push_str(&format!("    - **{}** {}\n", subitem.marker(), subitem.sentence));
            }
        }
    }
}

fn render_paragraph_heading(out: &mut String, paragraph: &Paragraph) {
    out.push_str(&format!("### {}\n{}\n\n", paragraph.num(), paragraph.sentence));
}
