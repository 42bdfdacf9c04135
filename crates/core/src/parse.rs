//! Recovers slides from a generated HTML presentation.
//!
//! Works against the markup contract documented in [`crate::render`], and
//! also accepts earlier hand-edited variants of it: slide containers with or
//! without `data-index`, a body block whose closing tags are not adjacent,
//! or paragraphs that sit directly in the slide.

use crate::text::{strip_tags, unescape_html};
use crate::types::{IndexedSlide, Slide};
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Opening tag of a slide container; group 1 is the declared index.
static SLIDE_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div class="slide(?:\s[^"]*)?" id="slide(\d+)"[^>]*>"#).unwrap());

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<h1 class="slide-title">(.*?)</h1>"#).unwrap());

/// Body block closed by its own `</div>` followed by the slide's `</div>`.
static BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="slide-body">(.*?)</div>\s*</div>"#).unwrap());

/// Body block up to its first `</div>`.
static BODY_LOOSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="slide-body">(.*?)</div>"#).unwrap());

static PARAGRAPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p(?:\s[^>]*)?>(.*?)</p>").unwrap());

static BR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// Line breaks in the markup itself (indentation, wrapping) are not content.
static SOURCE_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Regex-based reader for rendered presentations.
#[derive(Debug, Clone, Default)]
pub struct HtmlSlideParser;

impl HtmlSlideParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse slides, sorted by declared index.
    pub fn parse_slides(&self, html: &str) -> Result<Vec<Slide>> {
        Ok(self.parse(html)?.into_iter().map(|s| s.slide).collect())
    }

    /// Parse slides with their declared indices, sorted by index.
    pub fn parse(&self, html: &str) -> Result<Vec<IndexedSlide>> {
        let openings: Vec<(usize, usize, usize)> = SLIDE_OPEN_REGEX
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let index = caps.get(1)?.as_str().parse().ok()?;
                Some((index, whole.start(), whole.end()))
            })
            .collect();

        if openings.is_empty() {
            return Err(Error::HtmlParseError(
                "no <div class=\"slide\" id=\"slideN\"> containers found".into(),
            ));
        }

        let mut slides = Vec::with_capacity(openings.len());
        for (i, &(index, _, content_start)) in openings.iter().enumerate() {
            let content_end = openings.get(i + 1).map_or(html.len(), |next| next.1);
            let slide = parse_slide_markup(&html[content_start..content_end]);
            log::debug!(
                "slide{}: title={:?}, {} paragraphs",
                index,
                slide.title,
                slide.body.len()
            );
            slides.push(IndexedSlide { index, slide });
        }

        slides.sort_by_key(|s| s.index);
        Ok(slides)
    }
}

fn parse_slide_markup(markup: &str) -> Slide {
    let title_match = TITLE_REGEX.captures(markup);
    let title = title_match
        .as_ref()
        .and_then(|caps| caps.get(1))
        .map(|m| clean_fragment(m.as_str()))
        .filter(|t| !t.is_empty());

    let after_title = title_match
        .and_then(|caps| caps.get(0))
        .map_or(markup, |m| &markup[m.end()..]);

    let body_markup = BODY_REGEX
        .captures(after_title)
        .or_else(|| BODY_LOOSE_REGEX.captures(after_title))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    let mut body = body_markup.map(paragraphs).unwrap_or_default();
    if body.is_empty() {
        body = paragraphs(after_title);
    }

    Slide::new(title, body)
}

fn paragraphs(markup: &str) -> Vec<String> {
    PARAGRAPH_REGEX
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_fragment(m.as_str()))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Turn an element's inner markup back into plain text.
fn clean_fragment(fragment: &str) -> String {
    let flattened = SOURCE_BREAK_REGEX.replace_all(fragment.trim(), " ");
    let with_breaks = BR_REGEX.replace_all(&flattened, "\n");
    unescape_html(&strip_tags(&with_breaks)).trim().to_string()
}
