//! Paragraph text extraction from fetched HTML pages.
//!
//! Uses scraper to walk the parsed document. Text under boilerplate elements
//! (scripts, navigation, headers, footers, sidebars) is ignored. When the page
//! has a MediaWiki content region only its paragraphs are taken, otherwise
//! every paragraph in the document.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose whole subtree is treated as non-content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// Candidate primary content regions, most specific first.
const CONTENT_REGIONS: &[&str] = &["div#mw-content-text", "div.mw-parser-output"];

/// Extract the paragraph text of an HTML page, joined by single spaces and cut
/// to at most `max_chars` characters. Returns an empty string when the page
/// has no non-empty paragraphs.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let Ok(paragraph) = Selector::parse("p") else {
        return String::new();
    };

    let region = CONTENT_REGIONS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .find(|el| !inside_skipped(el))
    });

    let paragraphs: Vec<ElementRef<'_>> = match region {
        Some(region) => region.select(&paragraph).collect(),
        None => document.select(&paragraph).collect(),
    };

    let content = paragraphs
        .into_iter()
        .filter(|p| !inside_skipped(p))
        .map(|p| {
            let mut text = String::new();
            collect_text(p, &mut text);
            text.trim().to_string()
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&content, max_chars)
}

fn is_skipped(element: &ElementRef<'_>) -> bool {
    SKIPPED_ELEMENTS.contains(&element.value().name())
}

fn inside_skipped(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_skipped(&a))
}

/// Append the text nodes under `element`, skipping boilerplate subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !is_skipped(&child_element) {
                        collect_text(child_element, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
