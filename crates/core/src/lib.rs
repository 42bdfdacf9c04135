//! Core domain types, title classification, and HTML rendering/parsing
//! for slide deck conversion.

pub mod classify;
pub mod config;
pub mod error;
pub mod parse;
pub mod render;
pub mod text;
pub mod types;

pub use classify::{Classification, FontSize, RunSignals, SlideBuilder, TitleClassifier, TitleReason};
pub use config::ConvertConfig;
pub use error::{Error, Result};
pub use parse::HtmlSlideParser;
pub use render::HtmlRenderer;
pub use types::{Deck, DeckFormat, IndexedSlide, Slide};
