//! PPTX file parser implementation.

use deck_core::{Deck, DeckFormat, Error, FontSize, Result, RunSignals, SlideBuilder, TitleClassifier};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser {
    classifier: TitleClassifier,
}

impl PptxParser {
    /// Create a new PPTX parser using the given title heuristic.
    pub fn new(classifier: TitleClassifier) -> Self {
        Self { classifier }
    }

    /// Parse a PPTX file from disk.
    pub fn parse_path(&self, path: &Path) -> Result<Deck> {
        let file = File::open(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        self.parse(BufReader::new(file), filename)
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Deck> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = Deck::new(filename, DeckFormat::Pptx);

        let slide_order = get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            let shapes = extract_shape_signals(&content)?;

            let mut builder = SlideBuilder::new(&self.classifier);
            for shape in &shapes {
                builder.push(shape);
            }
            let slide = builder.build();
            log::debug!(
                "slide {} ({}): title={:?}, {} paragraphs",
                idx + 1,
                slide_path,
                slide.title,
                slide.body.len()
            );
            deck.add_slide(slide);
        }

        Ok(deck)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new(TitleClassifier::default())
    }
}

/// Get the ordered list of slide part paths.
///
/// The order comes from `p:sldIdLst` in `presentation.xml`; when that is
/// unavailable the slide relationships are ordered by their trailing number.
pub(crate) fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)
        .map_err(|_| Error::PptxParseError(format!("not a presentation: missing {}", PRESENTATION_RELS_PATH)))?;
    let slide_rels = parse_slide_relationships(&rels_content)?;

    let listed = match read_file_from_archive(archive, PRESENTATION_PATH) {
        Ok(content) => match parse_slide_id_list(&content) {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Unreadable slide list, falling back to numbering: {}", e);
                Vec::new()
            }
        },
        Err(e) => {
            log::warn!("{}", e);
            Vec::new()
        }
    };

    if !listed.is_empty() {
        let targets: HashMap<&str, &str> = slide_rels
            .iter()
            .map(|(id, target)| (id.as_str(), target.as_str()))
            .collect();
        let ordered: Vec<String> = listed
            .iter()
            .filter_map(|rid| match targets.get(rid.as_str()) {
                Some(target) => Some(resolve_target(target)),
                None => {
                    log::warn!("Slide relationship '{}' has no target", rid);
                    None
                }
            })
            .collect();
        if !ordered.is_empty() {
            return Ok(ordered);
        }
    }

    let mut slides: Vec<(String, Option<usize>)> = slide_rels
        .iter()
        .map(|(id, target)| {
            let order_num = extract_slide_number(target).or_else(|| extract_slide_number(id));
            (resolve_target(target), order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Read `(Id, Target)` for every slide relationship.
fn parse_slide_relationships(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                // Only the slide parts themselves, not layouts, masters or notes
                if rel_type.ends_with("/slide") {
                    if let (Some(id), Some(target)) = (attr_value(e, b"Id"), attr_value(e, b"Target")) {
                        slides.push((id, target));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Read the relationship ids of `p:sldIdLst`, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // `id` is the numeric slide id; the namespaced `r:id` is the relationship
                let rel_id = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    (key != b"id" && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Turn a relationship target into an archive path.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(parent_relative) = target.strip_prefix("../") {
        parent_relative.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Information about a shape extracted from XML.
#[derive(Debug, Default)]
pub(crate) struct ShapeInfo {
    name: Option<String>,
    placeholder_title: bool,
    font_size: Option<FontSize>,
    paragraphs: Vec<String>,
}

impl ShapeInfo {
    fn note_font_size(&mut self, size: FontSize) {
        self.font_size = Some(match self.font_size {
            Some(current) => current.max(size),
            None => size,
        });
    }

    fn text(&self) -> String {
        self.paragraphs.join("\n").trim().to_string()
    }

    /// Signals for the shape's text, or `None` when it holds no text.
    pub(crate) fn signals(&self, position: usize) -> Option<RunSignals> {
        let text = self.text();
        if text.is_empty() {
            return None;
        }
        Some(RunSignals {
            text,
            shape_name: self.name.clone(),
            placeholder_title: self.placeholder_title,
            font_size: self.font_size.unwrap_or(FontSize::Unspecified),
            position,
        })
    }
}

/// Extract one [`RunSignals`] per text-bearing shape, in document order.
pub fn extract_shape_signals(xml_content: &str) -> Result<Vec<RunSignals>> {
    let mut signals = Vec::new();
    for shape in read_shapes(xml_content) {
        if let Some(run) = shape.signals(signals.len()) {
            signals.push(run);
        }
    }
    Ok(signals)
}

/// Every `p:sp` of a slide in document order, text-bearing or not.
///
/// A shape left open when the document ends (truncated XML) is kept with
/// whatever text was read before the cut.
pub(crate) fn read_shapes(xml_content: &str) -> Vec<ShapeInfo> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    // Leading/trailing spaces inside a:t are content
    reader.trim_text(false);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        current_shape = Some(ShapeInfo::default());
                        in_text_body = false;
                    }
                    b"txBody" => {
                        in_text_body = true;
                    }
                    b"p" if in_text_body => {
                        if let Some(shape) = current_shape.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"t" if in_text_body => {
                        in_text = true;
                    }
                    b"br" if in_text_body => {
                        if let Some(paragraph) = current_shape
                            .as_mut()
                            .and_then(|shape| shape.paragraphs.last_mut())
                        {
                            paragraph.push('\n');
                        }
                    }
                    other => {
                        if let Some(shape) = current_shape.as_mut() {
                            apply_shape_property(shape, other, e, in_text_body);
                        }
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if let Some(shape) = current_shape.as_mut() {
                    match local {
                        b"br" if in_text_body => {
                            if let Some(paragraph) = shape.paragraphs.last_mut() {
                                paragraph.push('\n');
                            }
                        }
                        // An empty paragraph still separates lines
                        b"p" if in_text_body => shape.paragraphs.push(String::new()),
                        _ => apply_shape_property(shape, local, e, in_text_body),
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(paragraph) = current_shape
                        .as_mut()
                        .and_then(|shape| shape.paragraphs.last_mut())
                    {
                        match e.unescape() {
                            Ok(text) => paragraph.push_str(&text),
                            Err(err) => log::warn!("Skipping undecodable run text: {}", err),
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        if let Some(shape) = current_shape.take() {
                            shapes.push(shape);
                        }
                        in_text_body = false;
                        in_text = false;
                    }
                    b"txBody" => {
                        in_text_body = false;
                    }
                    b"t" => {
                        in_text = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                if let Some(shape) = current_shape.take() {
                    log::warn!("Slide XML ended inside a shape");
                    shapes.push(shape);
                }
                break;
            }
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                // Continue parsing despite errors
            }
            _ => {}
        }
    }

    shapes
}

/// Record shape name, placeholder role, and run font sizes.
fn apply_shape_property(shape: &mut ShapeInfo, local: &[u8], e: &BytesStart, in_text_body: bool) {
    match local {
        b"cNvPr" if shape.name.is_none() => {
            shape.name = attr_value(e, b"name");
        }
        b"ph" => {
            if let Some(kind) = attr_value(e, b"type") {
                shape.placeholder_title |= matches!(kind.as_str(), "title" | "ctrTitle");
            }
        }
        b"rPr" if in_text_body => {
            if let Some(sz) = attr_value(e, b"sz") {
                shape.note_font_size(FontSize::from_hundredths(&sz));
            }
        }
        _ => {}
    }
}

/// Value of an unprefixed attribute.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
        })
}

/// Read a file from the ZIP archive.
pub(crate) fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
pub(crate) fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    const REL_LAYOUT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Wrap shape XML in a slide document.
    pub(crate) fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    /// A text shape; each paragraph is a list of `(text, sz)` runs.
    pub(crate) fn shape(name: &str, ph: Option<&str>, paragraphs: &[&[(&str, Option<&str>)]]) -> String {
        let ph = ph
            .map(|t| format!(r#"<p:nvPr><p:ph type="{}"/></p:nvPr>"#, t))
            .unwrap_or_else(|| "<p:nvPr/>".to_string());
        let mut body = String::new();
        for runs in paragraphs {
            body.push_str("<a:p>");
            for (text, sz) in runs.iter() {
                let rpr = sz
                    .map(|s| format!(r#"<a:rPr lang="he-IL" sz="{}"/>"#, s))
                    .unwrap_or_else(|| r#"<a:rPr lang="he-IL"/>"#.to_string());
                body.push_str(&format!("<a:r>{}<a:t>{}</a:t></a:r>", rpr, text));
            }
            body.push_str("</a:p>");
        }
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{}"/><p:cNvSpPr/>{}</p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            name, ph, body
        )
    }

    /// Build an in-memory PPTX whose presentation lists slides in `order`
    /// (1-based part numbers).
    pub(crate) fn build_pptx(slides: &[String], order: &[usize]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opt = FileOptions::default();

        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        rels.push_str(&format!(
            r#"<Relationship Id="rId1" Type="{}" Target="slideLayouts/slideLayout1.xml"/>"#,
            REL_LAYOUT
        ));
        for n in 1..=slides.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                n + 1,
                REL_SLIDE,
                n
            ));
        }
        rels.push_str("</Relationships>");

        let mut pres = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>"#,
        );
        for (i, n) in order.iter().enumerate() {
            pres.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, n + 1));
        }
        pres.push_str("</p:sldIdLst></p:presentation>");

        zip.start_file(PRESENTATION_RELS_PATH, opt).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        zip.start_file(PRESENTATION_PATH, opt).unwrap();
        zip.write_all(pres.as_bytes()).unwrap();
        for (i, xml) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), opt).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_shape_signals() {
        let xml = slide_xml(&format!(
            "{}{}",
            shape("Title 1", Some("title"), &[&[("כותרת", None)]]),
            shape(
                "TextBox 2",
                None,
                &[&[("Hello ", Some("1800")), ("world", Some("2400"))], &[("second", None)]]
            ),
        ));

        let signals = extract_shape_signals(&xml).unwrap();
        assert_eq!(signals.len(), 2);

        assert_eq!(signals[0].text, "כותרת");
        assert_eq!(signals[0].shape_name.as_deref(), Some("Title 1"));
        assert!(signals[0].placeholder_title);
        assert_eq!(signals[0].font_size, FontSize::Unspecified);

        assert_eq!(signals[1].text, "Hello world\nsecond");
        assert_eq!(signals[1].font_size, FontSize::Declared(24.0));
        assert_eq!(signals[1].position, 1);
    }

    #[test]
    fn test_unreadable_size_is_reported() {
        let xml = slide_xml(&shape("TextBox 1", None, &[&[("text", Some("huge"))]]));
        let signals = extract_shape_signals(&xml).unwrap();
        assert_eq!(signals[0].font_size, FontSize::Unreadable);
    }

    #[test]
    fn test_line_break_and_entities() {
        let xml = slide_xml(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Body"/></p:nvSpPr><p:txBody><a:p><a:r><a:t>a &amp; b</a:t></a:r><a:br/><a:r><a:t>c </a:t></a:r><a:fld id="{1}" type="slidenum"><a:rPr lang="he-IL"/><a:t>7</a:t></a:fld></a:p></p:txBody></p:sp>"#,
        );
        let signals = extract_shape_signals(&xml).unwrap();
        assert_eq!(signals[0].text, "a & b\nc 7");
    }

    #[test]
    fn test_skips_shapes_without_text() {
        let xml = slide_xml(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Rect"/></p:nvSpPr><p:spPr/></p:sp>{}"#,
            shape("TextBox", None, &[&[("only", None)]])
        ));
        let signals = extract_shape_signals(&xml).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].position, 0);
    }

    #[test]
    fn test_truncated_slide_keeps_open_shape() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Body"/></p:nvSpPr><p:txBody><a:p><a:r><a:t>Hello</a:t></a:r></a:p><a:p><a:r><a:t"#;
        let signals = extract_shape_signals(xml).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].text, "Hello");
        assert_eq!(signals[0].shape_name.as_deref(), Some("Body"));
    }

    #[test]
    fn test_read_shapes_keeps_empty_shapes_in_order() {
        let xml = slide_xml(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Rect"/></p:nvSpPr><p:spPr/></p:sp>{}"#,
            shape("TextBox", None, &[&[("only", None)]])
        ));
        let shapes = read_shapes(&xml);
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].signals(0).is_none());
        assert_eq!(shapes[1].signals(0).map(|s| s.text).as_deref(), Some("only"));
    }

    #[test]
    fn test_parse_classifies_titles() {
        let slide = slide_xml(&format!(
            "{}{}{}",
            shape("TextBox 1", None, &[&[("מבוא", None)]]),
            shape("TextBox 2", None, &[&[("ספריה דיגיטלית חכמה", Some("4400"))]]),
            shape("TextBox 3", None, &[&[("עוד כותרת", Some("4000"))], &[("- נקודה", None)]]),
        ));
        let data = build_pptx(&[slide], &[1]);

        let deck = PptxParser::default().parse(Cursor::new(data), "deck.pptx").unwrap();
        assert_eq!(deck.format, DeckFormat::Pptx);
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].title.as_deref(), Some("ספריה דיגיטלית חכמה"));
        assert_eq!(deck.slides[0].body, vec!["מבוא", "עוד כותרת", "• נקודה"]);
    }

    #[test]
    fn test_parse_follows_presentation_order() {
        let slides: Vec<String> = ["one", "two", "three"]
            .iter()
            .map(|t| slide_xml(&shape("Title", None, &[&[(t, None)]])))
            .collect();
        let data = build_pptx(&slides, &[3, 1, 2]);

        let deck = PptxParser::default().parse(Cursor::new(data), "deck.pptx").unwrap();
        let titles: Vec<_> = deck.slides.iter().map(|s| s.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["three", "one", "two"]);
    }

    #[test]
    fn test_parse_falls_back_to_numbering_without_slide_list() {
        let slides: Vec<String> = ["one", "two"]
            .iter()
            .map(|t| slide_xml(&shape("Title", None, &[&[(t, None)]])))
            .collect();
        let data = build_pptx(&slides, &[]);

        let deck = PptxParser::default().parse(Cursor::new(data), "deck.pptx").unwrap();
        assert_eq!(deck.slides[0].title.as_deref(), Some("one"));
        assert_eq!(deck.slides[1].title.as_deref(), Some("two"));
    }

    #[test]
    fn test_dangling_slide_id_is_skipped() {
        // rId3 is listed but has no relationship
        let data = build_pptx(&[slide_xml("")], &[1, 2]);
        let deck = PptxParser::default().parse(Cursor::new(data), "x.pptx").unwrap();
        assert_eq!(deck.slides.len(), 1);
        assert!(deck.slides[0].is_empty());
    }

    #[test]
    fn test_zip_without_presentation_is_error() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("Index/Document.iwa", FileOptions::default()).unwrap();
        zip.write_all(b"\0\0\0\0").unwrap();
        let data = zip.finish().unwrap().into_inner();

        let err = PptxParser::default().parse(Cursor::new(data), "talk.key");
        assert!(matches!(err, Err(Error::PptxParseError(_))));
    }

    #[test]
    fn test_not_a_zip_is_error() {
        let err = PptxParser::default().parse(Cursor::new(b"not a zip".to_vec()), "x.pptx");
        assert!(matches!(err, Err(Error::ZipError(_))));
    }
}
