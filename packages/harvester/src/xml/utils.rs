//! XML utility functions for navigating and extracting data from DOM trees.
//!
//! Every lookup returns `Option` or an iterator, and every text accessor
//! returns an owned `String` that is empty when nothing was found, so callers
//! never have to special-case missing elements.

use roxmltree::{Document, Node, ParsingOptions};

/// Parse an XML document leniently.
///
/// A leading byte order mark is ignored and internal DTD subsets are
/// accepted, since some registry documents carry them.
pub fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use hourei_harvester::xml::get_tag_name;
///
/// let xml = r#"<Law><LawBody>text</LawBody></Law>"#;
/// let doc = Document::parse(xml).unwrap();
/// let body = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(body), "LawBody");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check whether a node is an element whose tag name contains `fragment`.
pub fn tag_contains(node: Node<'_, '_>, fragment: &str) -> bool {
    node.is_element() && get_tag_name(node).contains(fragment)
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use hourei_harvester::xml::find_child;
///
/// let xml = r#"<Article><ArticleTitle>第一条</ArticleTitle></Article>"#;
/// let doc = Document::parse(xml).unwrap();
/// let article = doc.root_element();
///
/// assert!(find_child(article, "ArticleTitle").is_some());
/// assert!(find_child(article, "ArticleCaption").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find the first descendant element (excluding `node` itself) with the given
/// tag name, in document order.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use hourei_harvester::xml::find_descendant;
///
/// let xml = r#"<Paragraph><ParagraphSentence><Sentence>本文</Sentence></ParagraphSentence></Paragraph>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let sentence = find_descendant(doc.root_element(), "Sentence");
/// assert_eq!(sentence.and_then(|n| n.text()), Some("本文"));
/// ```
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && get_tag_name(*n) == tag)
}

/// Find all descendant elements (excluding `node` itself) with the given tag
/// name, in document order.
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(move |n| n.is_element() && get_tag_name(*n) == tag)
}

/// Get the text directly inside a node, up to its first child element.
///
/// The text is returned as written (not trimmed); a missing text node gives
/// an empty string.
pub fn own_text(node: Node<'_, '_>) -> String {
    node.text().map(str::to_string).unwrap_or_default()
}

/// Concatenate the text of all descendant text nodes in document order.
///
/// Markup is dropped; whitespace is kept as written.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use hourei_harvester::xml::collect_text;
///
/// let xml = r#"<Sentence>前段<Ruby>法<Rt>ほう</Rt></Ruby>後段</Sentence>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(collect_text(doc.root_element()), "前段法ほう後段");
/// ```
pub fn collect_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}
