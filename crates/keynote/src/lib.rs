//! Keynote (.key) backend for slide text extraction.
//!
//! Keynote documents are read by asking Keynote itself for the text of each
//! slide (macOS only), falling back to scanning the archive's `.iwa` streams
//! for text runs. When neither yields anything the deck is empty.

pub mod archive;
pub mod automation;
pub mod organize;

use deck_core::config::{ClassifierConfig, KeynoteConfig, Labels};
use deck_core::{Deck, DeckFormat, Result, TitleClassifier};
use std::path::Path;
use std::time::Duration;

/// Extracts slides from Keynote documents.
pub struct KeynoteExtractor<'a> {
    config: &'a KeynoteConfig,
    classifier: TitleClassifier,
    labels: &'a Labels,
}

impl<'a> KeynoteExtractor<'a> {
    pub fn new(config: &'a KeynoteConfig, classifier: &ClassifierConfig, labels: &'a Labels) -> Self {
        Self {
            config,
            // Keynote output has no font sizes, so position and length decide
            classifier: TitleClassifier::new(classifier).with_leading_short_line(true),
            labels,
        }
    }

    /// Extract slides, trying automation first and the archive scan second.
    pub fn extract(&self, path: &Path) -> Result<Deck> {
        std::fs::metadata(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        let mut deck = Deck::new(filename, DeckFormat::Keynote);

        if self.config.use_automation {
            let timeout = Duration::from_secs(self.config.automation_timeout_secs);
            match automation::extract_slide_texts(path, self.config.open_delay_secs, timeout) {
                Ok(items) if items.iter().any(|i| !i.trim().is_empty()) => {
                    log::info!("{}: {} slides from Keynote", filename, items.len());
                    deck.slides = organize::slides_from_items(&items, &self.classifier, self.labels);
                    return Ok(deck);
                }
                Ok(_) => log::warn!("{}: Keynote returned no slide text", filename),
                Err(e) => log::warn!("{}: automation failed, scanning archive: {}", filename, e),
            }
        }

        match archive::scan_path(path, self.config.min_string_chars) {
            Ok(runs) if !runs.is_empty() => {
                log::info!("{}: {} text runs from archive", filename, runs.len());
                deck.slides = organize::group_runs(
                    &runs,
                    &self.classifier,
                    self.config.strings_per_slide,
                    self.config.min_slides,
                );
            }
            Ok(_) => log::warn!("{}: no text found in archive", filename),
            Err(e) => log::warn!("{}: archive scan failed: {}", filename, e),
        }

        Ok(deck)
    }
}
