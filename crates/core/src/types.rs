//! Domain types for representing slide deck content.

use crate::config::Labels;
use serde::{Deserialize, Serialize};

/// An ordered slide deck, the record every converter reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Source filename (without path).
    pub source: String,

    /// Format the deck was read from.
    pub format: DeckFormat,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck for the given source file and format.
    pub fn new(source: impl Into<String>, format: DeckFormat) -> Self {
        Self {
            source: source.into(),
            format,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the end of the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// True when no slide was extracted.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// The slides, or a single placeholder slide when the deck is empty.
    pub fn slides_or_placeholder(&self, labels: &Labels) -> Vec<Slide> {
        with_placeholder(&self.slides, labels)
    }

    /// Parse a deck from its JSON record.
    ///
    /// Titles and paragraphs are trimmed on the way in, so a record reads
    /// the same as a deck recovered from any other format.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mut deck: Self = serde_json::from_str(json)?;
        deck.slides = deck.slides.into_iter().map(Slide::trimmed).collect();
        Ok(deck)
    }

    /// Serialize the deck as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Return `slides` unchanged, or one guidance slide if there are none.
pub fn with_placeholder(slides: &[Slide], labels: &Labels) -> Vec<Slide> {
    if slides.is_empty() {
        vec![Slide::placeholder(labels)]
    } else {
        slides.to_vec()
    }
}

/// The representation a deck is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckFormat {
    /// PowerPoint (Office Open XML).
    Pptx,
    /// Apple Keynote archive.
    Keynote,
    /// HTML presentation produced by the renderer.
    Html,
    /// JSON deck record.
    Json,
}

impl DeckFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "key" => Some(Self::Keynote),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from the first bytes of a file.
    ///
    /// PPTX and Keynote share the ZIP magic, so a ZIP is reported as PPTX;
    /// use the extension first when it is known.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Some(Self::Json),
            Some(b'<') => Some(Self::Html),
            _ => None,
        }
    }

    /// Detect format from an optional extension, falling back to magic bytes.
    pub fn detect(ext: Option<&str>, head: &[u8]) -> Option<Self> {
        ext.and_then(Self::from_extension)
            .or_else(|| Self::from_magic(head))
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Keynote => "keynote",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// A single slide: at most one title and ordered body paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide heading, if one was identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body paragraphs in source order.
    #[serde(default)]
    pub body: Vec<String>,
}

impl Slide {
    /// Create a slide from a title and body paragraphs.
    pub fn new(title: Option<String>, body: Vec<String>) -> Self {
        Self { title, body }
    }

    /// The single guidance slide used when nothing could be extracted.
    pub fn placeholder(labels: &Labels) -> Self {
        Self {
            title: Some(labels.placeholder_title.clone()),
            body: vec![labels.placeholder_body.clone()],
        }
    }

    /// The slide with surrounding whitespace removed from title and
    /// paragraphs. A blank title becomes `None` and blank paragraphs are dropped.
    pub fn trimmed(self) -> Self {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let body = self
            .body
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self { title, body }
    }

    /// True when the slide has neither title nor body.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_empty()
    }
}

/// A slide together with the index declared for it in its source markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSlide {
    /// Declared 0-based index (`id="slide<N>"`).
    pub index: usize,

    /// The recovered slide.
    pub slide: Slide,
}
