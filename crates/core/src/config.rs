//! Conversion settings passed explicitly into every operation.
//!
//! All fields have defaults, so an empty JSON object is a complete
//! configuration and a config file only needs to name what it overrides.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Characters that would end a CSS string or declaration, or the `<style>` element.
const FONT_NAME_FORBIDDEN: &[char] = &['<', '>', ';', '{', '}', '\\', '"', '\n'];

/// Largest line spacing DrawingML accepts (13200%).
const MAX_LINE_SPACING_PCT: u32 = 13_200;

/// Top-level settings for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub classifier: ClassifierConfig,
    pub theme: Theme,
    pub render: RenderConfig,
    pub writer: WriterConfig,
    pub keynote: KeynoteConfig,
}

impl ConvertConfig {
    /// Load overrides from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse overrides from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.theme.fonts.is_empty() {
            return Err(Error::ConfigError("theme.fonts must not be empty".into()));
        }
        if let Some(font) = self
            .theme
            .fonts
            .iter()
            .find(|f| f.trim().is_empty() || f.contains(FONT_NAME_FORBIDDEN))
        {
            return Err(Error::ConfigError(format!("invalid font name '{}'", font)));
        }
        if !(1..=MAX_LINE_SPACING_PCT).contains(&self.writer.line_spacing_pct) {
            return Err(Error::ConfigError(format!(
                "writer.line_spacing_pct must be between 1 and {}",
                MAX_LINE_SPACING_PCT
            )));
        }
        if self.classifier.title_font_threshold_pt <= 0.0 {
            return Err(Error::ConfigError(
                "classifier.title_font_threshold_pt must be positive".into(),
            ));
        }
        if self.keynote.strings_per_slide == 0 {
            return Err(Error::ConfigError(
                "keynote.strings_per_slide must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds and markers for the title heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Runs strictly larger than this (in points) are titles.
    pub title_font_threshold_pt: f64,
    /// Maximum length (in chars, exclusive) of a leading line taken as title.
    pub short_line_max_chars: usize,
    /// Case-insensitive substrings of a shape name that mark a title shape.
    pub title_markers: Vec<String>,
    /// Treat a short single first line as the title.
    pub leading_short_line: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            title_font_threshold_pt: 32.0,
            short_line_max_chars: 100,
            title_markers: vec!["title".into(), "כותרת".into()],
            leading_short_line: false,
        }
    }
}

/// Colors and fonts shared by the HTML renderer and the PPTX writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub palette: Palette,
    /// Font fallback list, most preferred first.
    pub fonts: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            fonts: ["Arial Hebrew", "David", "Gisha", "Miriam", "Arial", "Calibri"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl Theme {
    /// The font actually written into documents that take a single typeface.
    pub fn primary_font(&self) -> &str {
        self.fonts.first().map(String::as_str).unwrap_or("Arial")
    }

    /// CSS `font-family` value: the fallback list, quoted, ending in `sans-serif`.
    pub fn css_font_stack(&self) -> String {
        let mut families: Vec<String> = self
            .fonts
            .iter()
            .map(|f| {
                let name = f.replace(|c: char| c == '\'' || FONT_NAME_FORBIDDEN.contains(&c), "");
                format!("'{}'", name)
            })
            .collect();
        families.push("sans-serif".to_string());
        families.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub background: Rgb,
    pub text: Rgb,
    pub text_light: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb(0, 51, 102),
            secondary: Rgb(0, 102, 204),
            accent: Rgb(255, 153, 0),
            background: Rgb(255, 255, 255),
            text: Rgb(20, 20, 20),
            text_light: Rgb(80, 80, 80),
        }
    }
}

/// An sRGB color, written as `#RRGGBB` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Uppercase hex digits without `#`, as used by DrawingML `srgbClr`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{}', expected #RRGGBB", value));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// User-facing strings embedded in generated documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub previous: String,
    pub next: String,
    pub keyboard_hint: String,
    pub placeholder_title: String,
    pub placeholder_body: String,
    /// Title given to a slide that came back empty; `{n}` is the 1-based number.
    pub empty_slide: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            previous: "← הקודם".into(),
            next: "הבא →".into(),
            keyboard_hint: "השתמש בחצים ← → לניווט".into(),
            placeholder_title: "שקופית 1".into(),
            placeholder_body: "פתח את המצגת ב-Keynote והעתק את התוכן".into(),
            empty_slide: "שקופית {n}".into(),
        }
    }
}

impl Labels {
    /// Title for an empty slide at the given 1-based position.
    pub fn empty_slide_title(&self, number: usize) -> String {
        self.empty_slide.replace("{n}", &number.to_string())
    }
}

/// Optional logo image shown in the corner of the HTML presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Settings for the HTML presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Value of the `lang` attribute; the document is always `dir="rtl"`.
    pub lang: String,
    pub document_title: String,
    pub labels: Labels,
    pub logo: Option<Logo>,
    /// Render the clickable slide-number rail.
    pub show_thumbnails: bool,
    pub swipe_threshold_px: u32,
    /// Delay before the keyboard hint fades out.
    pub hint_timeout_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lang: "he".into(),
            document_title: "מצגת".into(),
            labels: Labels::default(),
            logo: None,
            show_thumbnails: true,
            swipe_threshold_px: 50,
            hint_timeout_ms: 5000,
        }
    }
}

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// A textbox position and size in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl BoxGeometry {
    /// Build a box from inch measurements.
    pub fn inches(x: f64, y: f64, cx: f64, cy: f64) -> Self {
        let emu = |v: f64| (v * EMU_PER_INCH as f64).round() as i64;
        Self {
            x: emu(x),
            y: emu(y),
            cx: emu(cx),
            cy: emu(cy),
        }
    }
}

/// Layout and typography for generated PPTX files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub slide_width: i64,
    pub slide_height: i64,
    pub title_box: BoxGeometry,
    /// Body box used when the slide has a title.
    pub body_box: BoxGeometry,
    /// Body box used when the slide has no title.
    pub body_box_untitled: BoxGeometry,
    pub title_size_pt: f64,
    pub body_size_pt: f64,
    pub emphasis_size_pt: f64,
    pub space_after_pt: f64,
    /// Line spacing in percent.
    pub line_spacing_pct: u32,
    /// Language tag written on every run.
    pub lang: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            slide_width: 10 * EMU_PER_INCH,
            slide_height: 7 * EMU_PER_INCH + EMU_PER_INCH / 2,
            title_box: BoxGeometry::inches(0.5, 0.5, 9.0, 1.5),
            body_box: BoxGeometry::inches(0.5, 2.5, 9.0, 5.5),
            body_box_untitled: BoxGeometry::inches(0.5, 1.0, 9.0, 5.5),
            title_size_pt: 44.0,
            body_size_pt: 22.0,
            emphasis_size_pt: 24.0,
            space_after_pt: 12.0,
            line_spacing_pct: 130,
            lang: "he-IL".into(),
        }
    }
}

/// How Keynote documents are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeynoteConfig {
    /// Ask a running Keynote for slide text before scanning the archive.
    pub use_automation: bool,
    pub automation_timeout_secs: u64,
    /// Seconds the automation script waits after opening the document.
    pub open_delay_secs: u64,
    /// Shortest text run (in chars) kept by the archive scan.
    pub min_string_chars: usize,
    pub strings_per_slide: usize,
    /// Below this many slides the archive scan regroups in fixed chunks.
    pub min_slides: usize,
}

impl Default for KeynoteConfig {
    fn default() -> Self {
        Self {
            use_automation: true,
            automation_timeout_secs: 90,
            open_delay_secs: 4,
            min_string_chars: 4,
            strings_per_slide: 5,
            min_slides: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ConvertConfig::from_json("{}").unwrap(), ConvertConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ConvertConfig::from_json(
            r##"{"theme": {"palette": {"primary": "#112233"}}, "render": {"lang": "ar"}}"##,
        )
        .unwrap();

        assert_eq!(config.theme.palette.primary, Rgb(0x11, 0x22, 0x33));
        assert_eq!(config.theme.palette.secondary, Palette::default().secondary);
        assert_eq!(config.render.lang, "ar");
        assert_eq!(config.render.labels, Labels::default());
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(ConvertConfig::from_json(r#"{"theme": {"palette": {"text": "blue"}}}"#).is_err());
    }

    #[test]
    fn test_empty_font_list_rejected() {
        let err = ConvertConfig::from_json(r#"{"theme": {"fonts": []}}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_font_names_cannot_leave_the_stylesheet() {
        for font in ["Arial</style><script>", "A; color: red", "A}", ""] {
            let json = format!(r#"{{"theme": {{"fonts": [{}]}}}}"#, serde_json::to_string(font).unwrap());
            let err = ConvertConfig::from_json(&json).unwrap_err();
            assert!(matches!(err, Error::ConfigError(_)), "accepted {:?}", font);
        }
        assert!(ConvertConfig::from_json(r#"{"theme": {"fonts": ["Noto Sans Hebrew"]}}"#).is_ok());
    }

    #[test]
    fn test_line_spacing_bounds() {
        for pct in [0, 13_201, 4_294_967_295u32] {
            let json = format!(r#"{{"writer": {{"line_spacing_pct": {}}}}}"#, pct);
            assert!(matches!(ConvertConfig::from_json(&json), Err(Error::ConfigError(_))));
        }
        let config = ConvertConfig::from_json(r#"{"writer": {"line_spacing_pct": 150}}"#).unwrap();
        assert_eq!(config.writer.line_spacing_pct, 150);
    }

    #[test]
    fn test_rgb_formatting() {
        assert_eq!(Rgb(0, 102, 204).hex(), "0066CC");
        assert_eq!(Rgb(0, 102, 204).to_string(), "#0066CC");
        assert_eq!(Rgb::try_from("#ff9900".to_string()), Ok(Rgb(255, 153, 0)));
    }

    #[test]
    fn test_default_page_is_ten_by_seven_and_a_half_inches() {
        let writer = WriterConfig::default();
        assert_eq!(writer.slide_width, 9_144_000);
        assert_eq!(writer.slide_height, 6_858_000);
        assert_eq!(writer.title_box.cx, 9 * EMU_PER_INCH);
    }

    #[test]
    fn test_css_font_stack() {
        let theme = Theme {
            fonts: vec!["Arial Hebrew".into(), "David".into()],
            ..Theme::default()
        };
        assert_eq!(theme.css_font_stack(), "'Arial Hebrew', 'David', sans-serif");
        assert_eq!(theme.primary_font(), "Arial Hebrew");

        let hostile = Theme {
            fonts: vec!["X'</style><script>".into()],
            ..Theme::default()
        };
        assert_eq!(hostile.css_font_stack(), "'X/stylescript', sans-serif");
    }

    #[test]
    fn test_empty_slide_title() {
        assert_eq!(Labels::default().empty_slide_title(3), "שקופית 3");
    }
}
