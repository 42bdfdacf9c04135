//! Title/body classification for slide text.
//!
//! A source document gives us text runs with whatever metadata it could
//! provide: font size, shape name, placeholder role, position on the slide.
//! [`TitleClassifier`] turns those signals into a [`Classification`] without
//! touching the document, and [`SlideBuilder`] applies the one-title-per-slide
//! rule while assembling a [`Slide`].
//!
//! Ambiguous cases fall through to body text: taking a title for body text is
//! preferred over promoting body text to a second title.

use crate::config::ClassifierConfig;
use crate::text;
use crate::types::Slide;

/// Font size of a run, as far as the source document could tell us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSize {
    /// An explicit size in points.
    Declared(f64),
    /// No size on the run; it inherits from a layout or master.
    Unspecified,
    /// A size attribute was present but could not be read.
    Unreadable,
}

impl FontSize {
    /// Combine two observations, keeping the larger declared size.
    ///
    /// A declared size always wins over an unknown one, and an unreadable
    /// value is kept only when nothing was declared.
    pub fn max(self, other: FontSize) -> FontSize {
        match (self, other) {
            (FontSize::Declared(a), FontSize::Declared(b)) => FontSize::Declared(a.max(b)),
            (FontSize::Declared(a), _) | (_, FontSize::Declared(a)) => FontSize::Declared(a),
            (FontSize::Unreadable, _) | (_, FontSize::Unreadable) => FontSize::Unreadable,
            _ => FontSize::Unspecified,
        }
    }

    /// Parse a DrawingML `sz` attribute (hundredths of a point).
    pub fn from_hundredths(raw: &str) -> FontSize {
        match raw.trim().parse::<u32>() {
            Ok(v) => FontSize::Declared(f64::from(v) / 100.0),
            Err(_) => FontSize::Unreadable,
        }
    }
}

/// What we observed about one run (or one shape's worth of text).
#[derive(Debug, Clone, PartialEq)]
pub struct RunSignals {
    pub text: String,
    pub shape_name: Option<String>,
    /// The shape is a title or centered-title placeholder.
    pub placeholder_title: bool,
    pub font_size: FontSize,
    /// 0-based position among the text-bearing runs on the slide.
    pub position: usize,
}

impl RunSignals {
    /// Signals for plain text with no formatting metadata.
    pub fn plain(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            shape_name: None,
            placeholder_title: false,
            font_size: FontSize::Unspecified,
            position,
        }
    }
}

/// Why a run was taken as a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleReason {
    ShapeName,
    Placeholder,
    FontSize,
    LeadingShortLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Title(TitleReason),
    Body,
}

impl Classification {
    pub fn is_title(&self) -> bool {
        matches!(self, Classification::Title(_))
    }
}

/// Pure title heuristic over [`RunSignals`].
#[derive(Debug, Clone)]
pub struct TitleClassifier {
    threshold_pt: f64,
    short_line_max_chars: usize,
    markers: Vec<String>,
    leading_short_line: bool,
}

impl Default for TitleClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl TitleClassifier {
    /// Create a classifier from configuration.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            threshold_pt: config.title_font_threshold_pt,
            short_line_max_chars: config.short_line_max_chars,
            markers: config.title_markers.iter().map(|m| m.to_lowercase()).collect(),
            leading_short_line: config.leading_short_line,
        }
    }

    /// Enable or disable the leading-short-line rule.
    pub fn with_leading_short_line(mut self, enabled: bool) -> Self {
        self.leading_short_line = enabled;
        self
    }

    /// Decide whether a run looks like a slide title.
    pub fn classify(&self, signals: &RunSignals) -> Classification {
        if let Some(name) = &signals.shape_name {
            let name = name.to_lowercase();
            if self.markers.iter().any(|m| !m.is_empty() && name.contains(m.as_str())) {
                return Classification::Title(TitleReason::ShapeName);
            }
        }

        if signals.placeholder_title {
            return Classification::Title(TitleReason::Placeholder);
        }

        if let FontSize::Declared(pt) = signals.font_size {
            if pt > self.threshold_pt {
                return Classification::Title(TitleReason::FontSize);
            }
        }

        if self.leading_short_line && signals.position == 0 && self.is_short_line(&signals.text) {
            return Classification::Title(TitleReason::LeadingShortLine);
        }

        Classification::Body
    }

    fn is_short_line(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty()
            && !trimmed.contains('\n')
            && trimmed.chars().count() < self.short_line_max_chars
    }
}

/// Assembles one slide, accepting at most one title.
#[derive(Debug)]
pub struct SlideBuilder<'a> {
    classifier: &'a TitleClassifier,
    title: Option<String>,
    body: Vec<String>,
}

impl<'a> SlideBuilder<'a> {
    pub fn new(classifier: &'a TitleClassifier) -> Self {
        Self {
            classifier,
            title: None,
            body: Vec::new(),
        }
    }

    /// Classify a run and file it as the title or as body paragraphs.
    pub fn push(&mut self, signals: &RunSignals) -> Classification {
        let text = text::clean_block(&signals.text);
        if text.is_empty() {
            return Classification::Body;
        }

        let classification = if self.title.is_none() {
            self.classifier.classify(signals)
        } else {
            Classification::Body
        };

        if classification.is_title() {
            log::debug!("title ({:?}): {}", classification, text);
            self.title = Some(text);
        } else {
            self.body.extend(
                text::split_paragraphs(&text)
                    .into_iter()
                    .map(|p| text::normalize_bullet(&p)),
            );
        }

        classification
    }

    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }

    pub fn build(self) -> Slide {
        Slide::new(self.title, self.body)
    }
}

/// Leading characters that mark a body paragraph as a sub-heading.
const EMPHASIS_PREFIXES: &[&str] = &[
    "📚", "🤖", "💬", "📊", "📖", "🔍", "❌", "✅", "💡", "🎯", "📈",
];

/// Whether a body paragraph should be styled as a sub-heading.
///
/// True for paragraphs opening with one of the marker emoji, short
/// paragraphs (under 50 chars) containing a colon, and percentages.
pub fn is_emphasis_paragraph(text: &str) -> bool {
    let text = text.trim();
    EMPHASIS_PREFIXES.iter().any(|p| text.starts_with(p))
        || (text.chars().count() < 50 && text.contains(':'))
        || text.ends_with('%')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(text: &str, pt: f64, position: usize) -> RunSignals {
        RunSignals {
            font_size: FontSize::Declared(pt),
            ..RunSignals::plain(text, position)
        }
    }

    #[test]
    fn test_font_size_above_threshold_is_title() {
        let classifier = TitleClassifier::default();
        assert_eq!(
            classifier.classify(&sized("ספריה דיגיטלית", 44.0, 2)),
            Classification::Title(TitleReason::FontSize)
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let classifier = TitleClassifier::default();
        assert_eq!(classifier.classify(&sized("Exactly 32", 32.0, 0)), Classification::Body);
        assert!(classifier.classify(&sized("Just over", 32.01, 0)).is_title());
    }

    #[test]
    fn test_unknown_sizes_are_body() {
        let classifier = TitleClassifier::default();
        let mut signals = RunSignals::plain("Heading", 0);
        assert_eq!(classifier.classify(&signals), Classification::Body);

        signals.font_size = FontSize::Unreadable;
        assert_eq!(classifier.classify(&signals), Classification::Body);
    }

    #[test]
    fn test_shape_name_markers() {
        let classifier = TitleClassifier::default();

        let mut signals = RunSignals::plain("Agenda", 3);
        signals.shape_name = Some("Title 1".into());
        assert_eq!(
            classifier.classify(&signals),
            Classification::Title(TitleReason::ShapeName)
        );

        signals.shape_name = Some("כותרת 2".into());
        assert!(classifier.classify(&signals).is_title());

        signals.shape_name = Some("TextBox 4".into());
        assert_eq!(classifier.classify(&signals), Classification::Body);
    }

    #[test]
    fn test_placeholder_role() {
        let classifier = TitleClassifier::default();
        let mut signals = RunSignals::plain("Agenda", 1);
        signals.placeholder_title = true;
        assert_eq!(
            classifier.classify(&signals),
            Classification::Title(TitleReason::Placeholder)
        );
    }

    #[test]
    fn test_leading_short_line_only_when_enabled() {
        let classifier = TitleClassifier::default();
        let signals = RunSignals::plain("האתגר:", 0);
        assert_eq!(classifier.classify(&signals), Classification::Body);

        let classifier = classifier.with_leading_short_line(true);
        assert_eq!(
            classifier.classify(&signals),
            Classification::Title(TitleReason::LeadingShortLine)
        );
        assert_eq!(classifier.classify(&RunSignals::plain("האתגר:", 1)), Classification::Body);
        assert_eq!(
            classifier.classify(&RunSignals::plain("two\nlines", 0)),
            Classification::Body
        );
        assert_eq!(
            classifier.classify(&RunSignals::plain("x".repeat(100), 0)),
            Classification::Body
        );
        assert!(classifier.classify(&RunSignals::plain("x".repeat(99), 0)).is_title());
    }

    #[test]
    fn test_builder_accepts_one_title() {
        let classifier = TitleClassifier::default();
        let mut builder = SlideBuilder::new(&classifier);

        assert!(builder.push(&sized("First heading", 40.0, 0)).is_title());
        assert_eq!(builder.push(&sized("Second heading", 48.0, 1)), Classification::Body);
        builder.push(&RunSignals::plain("line one\n\n  line two  ", 2));

        let slide = builder.build();
        assert_eq!(slide.title.as_deref(), Some("First heading"));
        assert_eq!(slide.body, vec!["Second heading", "line one", "line two"]);
    }

    #[test]
    fn test_title_never_in_body() {
        let classifier = TitleClassifier::default();
        let mut builder = SlideBuilder::new(&classifier);
        builder.push(&RunSignals::plain("intro", 0));
        builder.push(&sized("Big", 36.0, 1));

        let slide = builder.build();
        assert_eq!(slide.title.as_deref(), Some("Big"));
        assert_eq!(slide.body, vec!["intro"]);
    }

    #[test]
    fn test_builder_skips_blank_runs() {
        let classifier = TitleClassifier::default();
        let mut builder = SlideBuilder::new(&classifier);
        builder.push(&sized("   ", 60.0, 0));
        assert!(!builder.has_title());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_builder_normalizes_bullets() {
        let classifier = TitleClassifier::default();
        let mut builder = SlideBuilder::new(&classifier);
        builder.push(&RunSignals::plain("- first\n* second\n•third", 0));
        assert_eq!(builder.build().body, vec!["• first", "• second", "• third"]);
    }

    #[test]
    fn test_font_size_max() {
        use FontSize::*;
        assert_eq!(Declared(20.0).max(Declared(44.0)), Declared(44.0));
        assert_eq!(Unreadable.max(Declared(18.0)), Declared(18.0));
        assert_eq!(Unspecified.max(Unreadable), Unreadable);
        assert_eq!(Unspecified.max(Unspecified), Unspecified);
    }

    #[test]
    fn test_font_size_from_hundredths() {
        assert_eq!(FontSize::from_hundredths("4400"), FontSize::Declared(44.0));
        assert_eq!(FontSize::from_hundredths("big"), FontSize::Unreadable);
    }

    #[test]
    fn test_emphasis_paragraph() {
        assert!(is_emphasis_paragraph("💡 רעיון מרכזי"));
        assert!(is_emphasis_paragraph("בעיות קיימות:"));
        assert!(is_emphasis_paragraph("חיסכון של 40%"));
        assert!(!is_emphasis_paragraph("פסקה רגילה ללא סימנים מיוחדים"));
    }
}
