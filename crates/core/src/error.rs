//! Error types for slide deck conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, converting, or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Failed to read a Keynote document.
    #[error("Keynote error: {0}")]
    KeynoteError(String),

    /// The desktop application used for automation could not be driven.
    #[error("Automation unavailable: {0}")]
    AutomationUnavailable(String),

    /// The automation call did not finish in time.
    #[error("Automation timed out after {seconds}s")]
    AutomationTimeout { seconds: u64 },

    /// The HTML document did not contain any recognizable slides.
    #[error("HTML parsing error: {0}")]
    HtmlParseError(String),

    /// ZIP archive error (PPTX and Keynote packages).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Deck record could not be (de)serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
