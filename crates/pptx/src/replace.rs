//! Find-and-replace over the run text of an existing presentation.
//!
//! Only `a:t` content inside slide parts is touched; every other entry is
//! copied through without recompression. A match that spans two runs is
//! not found, since each run is rewritten on its own.

use crate::parser::{get_slide_order, local_name};
use deck_core::{Error, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// What a replacement pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    /// Replacements made across all slides.
    pub total: usize,
    /// Replacements per 1-based slide number; slides without changes are omitted.
    pub per_slide: BTreeMap<usize, usize>,
}

/// Ordered `(find, replace)` pairs applied to slide text.
#[derive(Debug, Clone)]
pub struct TextReplacer {
    replacements: Vec<(String, String)>,
    slides: Option<BTreeSet<usize>>,
}

impl TextReplacer {
    /// Create a replacer. Pairs apply in order, each to the output of the last.
    pub fn new(replacements: Vec<(String, String)>) -> Result<Self> {
        if replacements.iter().any(|(find, _)| find.is_empty()) {
            return Err(Error::ConfigError("replacement search text must not be empty".into()));
        }
        Ok(Self {
            replacements,
            slides: None,
        })
    }

    /// Restrict replacement to the given 1-based slide numbers.
    pub fn only_slides(mut self, slides: impl IntoIterator<Item = usize>) -> Self {
        self.slides = Some(slides.into_iter().collect());
        self
    }

    /// Apply every pair to one run of text, returning the result and match count.
    pub fn apply_to_text(&self, text: &str) -> (String, usize) {
        let mut current = text.to_string();
        let mut count = 0;
        for (find, replace) in &self.replacements {
            let found = current.matches(find.as_str()).count();
            if found > 0 {
                current = current.replace(find.as_str(), replace);
                count += found;
            }
        }
        (current, count)
    }

    /// Rewrite the `a:t` text of one slide part.
    pub fn replace_in_xml(&self, xml: &str) -> Result<(String, usize)> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut in_text = false;
        let mut count = 0;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;
            match event {
                Event::Eof => break,
                Event::Start(ref e) if local_name(e.name().as_ref()) == b"t" => in_text = true,
                Event::End(ref e) if local_name(e.name().as_ref()) == b"t" => in_text = false,
                Event::Text(ref e) if in_text => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad run text: {}", e)))?;
                    let (replaced, found) = self.apply_to_text(&text);
                    if found > 0 {
                        count += found;
                        writer
                            .write_event(Event::Text(BytesText::new(&replaced)))
                            .map_err(|e| Error::XmlError(e.to_string()))?;
                        continue;
                    }
                }
                _ => {}
            }
            writer
                .write_event(event)
                .map_err(|e| Error::XmlError(e.to_string()))?;
        }

        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Rewritten slide is not UTF-8: {}", e)))?;
        Ok((xml, count))
    }

    /// Copy a presentation from `input` to `output`, replacing slide text.
    pub fn replace<R: Read + Seek, W: Write + Seek>(&self, input: R, output: W) -> Result<ReplaceReport> {
        let mut archive =
            ZipArchive::new(input).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_numbers: HashMap<String, usize> = get_slide_order(&mut archive)?
            .into_iter()
            .enumerate()
            .map(|(i, path)| (path, i + 1))
            .collect();

        if let Some(wanted) = &self.slides {
            for n in wanted {
                if *n == 0 || *n > slide_numbers.len() {
                    log::warn!("Slide {} does not exist ({} slides)", n, slide_numbers.len());
                }
            }
        }

        let mut report = ReplaceReport::default();
        let mut zip = ZipWriter::new(output);

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            let name = file.name().to_string();

            let number = slide_numbers
                .get(&name)
                .copied()
                .filter(|n| self.slides.as_ref().map_or(true, |wanted| wanted.contains(n)));

            let Some(number) = number else {
                zip.raw_copy_file(file)
                    .map_err(|e| Error::ZipError(format!("Failed to copy '{}': {}", name, e)))?;
                continue;
            };

            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            let options = FileOptions::default().compression_method(file.compression());
            drop(file);

            let (rewritten, found) = self.replace_in_xml(&content)?;
            if found > 0 {
                log::debug!("slide {}: {} replacements", number, found);
                report.total += found;
                report.per_slide.insert(number, found);
            }

            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
            zip.write_all(rewritten.as_bytes())?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to write archive: {}", e)))?;
        Ok(report)
    }

    /// Replace text in a file on disk; `output` may be the input path.
    pub fn replace_file(&self, input: &Path, output: &Path) -> Result<ReplaceReport> {
        let data = std::fs::read(input)?;
        let mut out = Cursor::new(Vec::with_capacity(data.len()));
        let report = self.replace(Cursor::new(data), &mut out)?;
        std::fs::write(output, out.into_inner())?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::{build_pptx, shape, slide_xml};
    use crate::parser::PptxParser;

    fn replacer(pairs: &[(&str, &str)]) -> TextReplacer {
        TextReplacer::new(
            pairs
                .iter()
                .map(|(f, r)| (f.to_string(), r.to_string()))
                .collect(),
        )
        .unwrap()
    }

    fn deck_of(titles: &[&str]) -> Vec<u8> {
        let slides: Vec<String> = titles
            .iter()
            .map(|t| slide_xml(&shape("Title 1", None, &[&[(t, None)]])))
            .collect();
        let order: Vec<usize> = (1..=titles.len()).collect();
        build_pptx(&slides, &order)
    }

    fn titles(data: Vec<u8>) -> Vec<String> {
        PptxParser::default()
            .parse(Cursor::new(data), "x.pptx")
            .unwrap()
            .slides
            .into_iter()
            .map(|s| s.title.unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_apply_to_text_in_order() {
        let r = replacer(&[("מפוזר", "מבוזר"), ("מבוזר", "מבוזר מאוד")]);
        let (text, count) = r.apply_to_text("שרת מפוזר ומפוזר");
        assert_eq!(text, "שרת מבוזר מאוד ומבוזר מאוד");
        assert_eq!(count, 4);
    }

    #[test]
    fn test_empty_find_rejected() {
        assert!(matches!(
            TextReplacer::new(vec![(String::new(), "x".into())]),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_replace_in_xml_keeps_markup() {
        let xml = slide_xml(&shape("Body", None, &[&[("A &amp; old", Some("2000")), ("old", None)]]));
        let (out, count) = replacer(&[("old", "new & <shiny>")]).replace_in_xml(&xml).unwrap();

        assert_eq!(count, 2);
        assert!(out.contains("<a:t>A &amp; new &amp; &lt;shiny&gt;</a:t>"));
        assert!(out.contains(r#"<a:rPr lang="he-IL" sz="2000"/>"#));
        assert!(out.contains(r#"name="Body""#));
    }

    #[test]
    fn test_shape_names_are_not_replaced() {
        let xml = slide_xml(&shape("old", None, &[&[("text", None)]]));
        let (out, count) = replacer(&[("old", "new")]).replace_in_xml(&xml).unwrap();
        assert_eq!(count, 0);
        assert!(out.contains(r#"name="old""#));
    }

    #[test]
    fn test_replace_across_deck() {
        let data = deck_of(&["מערכת מפוזרת", "ללא שינוי", "מפוזר ומפוזר"]);
        let mut out = Cursor::new(Vec::new());
        let report = replacer(&[("מפוזר", "מבוזר")]).replace(Cursor::new(data), &mut out).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.per_slide, BTreeMap::from([(1, 1), (3, 2)]));
        assert_eq!(titles(out.into_inner()), vec!["מערכת מבוזרת", "ללא שינוי", "מבוזר ומבוזר"]);
    }

    #[test]
    fn test_replace_only_selected_slides() {
        let data = deck_of(&["old", "old", "old"]);
        let mut out = Cursor::new(Vec::new());
        let report = replacer(&[("old", "new")])
            .only_slides([2, 9])
            .replace(Cursor::new(data), &mut out)
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(titles(out.into_inner()), vec!["old", "new", "old"]);
    }

    #[test]
    fn test_replace_file_in_place() {
        let dir = std::env::temp_dir().join(format!("deck-replace-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deck.pptx");
        std::fs::write(&path, deck_of(&["old title"])).unwrap();

        let report = replacer(&[("old", "new")]).replace_file(&path, &path).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(titles(std::fs::read(&path).unwrap()), vec!["new title"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
