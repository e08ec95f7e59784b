//! Article extraction on top of Mozilla's Readability algorithm.
//!
//! `readabilityrs` picks the article container and returns it as cleaned
//! HTML. That HTML is flattened to its text nodes, minus anything inside page
//! furniture such as `nav` or `script`, joined with single spaces. Pages
//! Readability gives up on fall back to the text of `body`.

use lazy_static::lazy_static;
use readabilityrs::Readability;
use scraper::{ElementRef, Html, Node, Selector};
use tf_core::{ArticleExtractor, Error, Result};
use tracing::debug;

const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "button", "template",
];

lazy_static! {
    static ref BODY: Selector = Selector::parse("body").expect("valid selector");
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArticleExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str) -> Result<String> {
        let text = match article_html(html)? {
            Some(content) => flatten(&Html::parse_fragment(&content)),
            None => String::new(),
        };
        if !text.is_empty() {
            return Ok(text);
        }

        debug!("Readability found no article, using the page body");
        let text = flatten(&Html::parse_document(html));
        if text.is_empty() {
            return Err(Error::Extraction("no readable text found".to_string()));
        }
        Ok(text)
    }
}

/// Cleaned article HTML, or `None` when Readability finds no article.
fn article_html(html: &str) -> Result<Option<String>> {
    let readability = Readability::new(html, None, None)
        .map_err(|e| Error::Extraction(format!("readability: {}", e)))?;
    Ok(readability
        .parse()
        .and_then(|article| article.content)
        .filter(|content| !content.trim().is_empty()))
}

fn flatten(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    visible_text(root)
}

/// Text of `root` with noise subtrees dropped and whitespace collapsed.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut words = Vec::new();
    push_words(root, &mut words);
    words.join(" ")
}

fn push_words<'a>(element: ElementRef<'a>, words: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => words.extend(text.split_whitespace()),
            Node::Element(el) if NOISE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_words(child, words);
                }
            }
            _ => {}
        }
    }
}
