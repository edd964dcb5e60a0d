use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li").expect("static selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("document contains binary data")]
    Binary,
}

/// The parts of a page the crawl cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPage {
    pub title: String,
    /// Text of `p` and `li` elements, one element per line.
    pub text: String,
    /// Absolute http(s) links in document order, without duplicates.
    pub links: Vec<String>,
}

pub fn parse(raw_html: &str) -> Result<ParsedPage, ParseError> {
    if raw_html.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if raw_html.contains('\0') {
        return Err(ParseError::Binary);
    }

    let document = Html::parse_document(raw_html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let text = document
        .select(&TEXT_SELECTOR)
        .map(element_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut seen = HashSet::new();
    let links = document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(absolute_http_link)
        .filter(|link| seen.insert(link.clone()))
        .collect();

    Ok(ParsedPage { title, text, links })
}

/// Element text with whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps only hrefs that are already absolute http(s) URLs. Relative links are
/// dropped, not resolved.
fn absolute_http_link(href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }
    let url = Url::parse(href).ok()?;
    url.host_str()?;
    Some(url.to_string())
}
