//! Restyling of an existing presentation for right-to-left reading.
//!
//! Each slide's shapes are classified with the same title heuristic the
//! parser uses. The title shape gets the title typography, every other
//! text-bearing shape the body typography, and the slide background is
//! replaced with a solid fill. Paragraphs become right-aligned RTL. Text is
//! never changed, and entries other than slide parts are copied through
//! without recompression.

use crate::parser::{get_slide_order, local_name, read_shapes};
use crate::writer::{hundredths, run_fill_and_fonts_xml, spacing_xml};
use deck_core::config::{Theme, WriterConfig};
use deck_core::{Error, Result, TitleClassifier};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Body runs below this size (in points) are raised to the body size.
const MIN_BODY_SIZE_PT: f64 = 14.0;

/// Inner left and right margin of body shapes, in EMU (half an inch).
const BODY_INSET_EMU: i64 = 457_200;

/// Children of `a:pPr` replaced by the restyled spacing.
const SPACING_TAGS: &[&[u8]] = &[b"lnSpc", b"spcBef", b"spcAft"];

/// What a restyling pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestyleReport {
    /// Slide parts rewritten.
    pub slides: usize,
    /// Shapes styled as slide titles.
    pub titles: usize,
    /// Shapes styled as body text.
    pub body_shapes: usize,
}

/// How a shape is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Title,
    Body,
}

/// An element whose direct children are filtered while it is copied.
struct Filter {
    depth: usize,
    keep: fn(&[u8]) -> bool,
}

/// Applies the title and body typography to existing slides.
pub struct Restyler<'a> {
    config: &'a WriterConfig,
    theme: &'a Theme,
    classifier: TitleClassifier,
}

impl<'a> Restyler<'a> {
    pub fn new(config: &'a WriterConfig, theme: &'a Theme, classifier: TitleClassifier) -> Self {
        Self {
            config,
            theme,
            classifier,
        }
    }

    /// Copy a presentation from `input` to `output`, restyling every slide.
    pub fn restyle<R: Read + Seek, W: Write + Seek>(&self, input: R, output: W) -> Result<RestyleReport> {
        let mut archive =
            ZipArchive::new(input).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_numbers: HashMap<String, usize> = get_slide_order(&mut archive)?
            .into_iter()
            .enumerate()
            .map(|(i, path)| (path, i + 1))
            .collect();

        let mut report = RestyleReport::default();
        let mut zip = ZipWriter::new(output);

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            let name = file.name().to_string();

            let Some(&number) = slide_numbers.get(&name) else {
                zip.raw_copy_file(file)
                    .map_err(|e| Error::ZipError(format!("Failed to copy '{}': {}", name, e)))?;
                continue;
            };

            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            let options = FileOptions::default().compression_method(file.compression());
            drop(file);

            let roles = self.shape_roles(&content, number == 1);
            let rewritten = match self.restyle_xml(&content, &roles) {
                Ok(xml) => {
                    report.slides += 1;
                    report.titles += roles.iter().filter(|r| **r == Some(Role::Title)).count();
                    report.body_shapes += roles.iter().filter(|r| **r == Some(Role::Body)).count();
                    xml
                }
                Err(e) => {
                    log::warn!("slide {}: left unchanged: {}", number, e);
                    content
                }
            };

            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
            zip.write_all(rewritten.as_bytes())?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to write archive: {}", e)))?;
        log::debug!(
            "restyled {} slides ({} titles, {} body shapes)",
            report.slides,
            report.titles,
            report.body_shapes
        );
        Ok(report)
    }

    /// Restyle a file on disk; `output` may be the input path.
    pub fn restyle_file(&self, input: &Path, output: &Path) -> Result<RestyleReport> {
        let data = std::fs::read(input)?;
        let mut out = Cursor::new(Vec::with_capacity(data.len()));
        let report = self.restyle(Cursor::new(data), &mut out)?;
        std::fs::write(output, out.into_inner())?;
        Ok(report)
    }

    /// Role of every `p:sp` on a slide, `None` for shapes without text.
    ///
    /// At most one shape is the title. On the first slide a short leading
    /// text also counts as the title.
    fn shape_roles(&self, xml: &str, first_slide: bool) -> Vec<Option<Role>> {
        let leading;
        let classifier = if first_slide {
            leading = self.classifier.clone().with_leading_short_line(true);
            &leading
        } else {
            &self.classifier
        };

        let mut position = 0;
        let mut has_title = false;
        read_shapes(xml)
            .iter()
            .map(|shape| {
                let signals = shape.signals(position)?;
                position += 1;
                if !has_title && classifier.classify(&signals).is_title() {
                    has_title = true;
                    Some(Role::Title)
                } else {
                    Some(Role::Body)
                }
            })
            .collect()
    }

    /// Rewrite one slide part given the role of each of its shapes.
    fn restyle_xml(&self, xml: &str, roles: &[Option<Role>]) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + 1024));

        let mut shapes = roles.iter();
        let mut role: Option<Role> = None;
        let mut in_text_body = false;
        // Element expected next, and the markup to insert if it is missing
        let mut pending: Option<(&'static [u8], String)> = None;
        let mut filter: Option<Filter> = None;
        let mut skip_depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;
            if let Event::Eof = event {
                break;
            }

            if skip_depth > 0 {
                match event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    _ => {}
                }
                continue;
            }

            if let Some(active) = filter.as_mut() {
                match &event {
                    Event::Start(e) if active.depth == 1 && !(active.keep)(local_name(e.name().as_ref())) => {
                        skip_depth = 1;
                        continue;
                    }
                    Event::Empty(e) if active.depth == 1 && !(active.keep)(local_name(e.name().as_ref())) => {
                        continue;
                    }
                    Event::Start(_) => active.depth += 1,
                    Event::End(_) => active.depth -= 1,
                    _ => {}
                }
                if active.depth == 0 {
                    filter = None;
                }
                write_event(&mut writer, event)?;
                continue;
            }

            if let Some((tag, markup)) = pending.take() {
                match &event {
                    Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {
                        pending = Some((tag, markup));
                        write_event(&mut writer, event.borrow())?;
                        continue;
                    }
                    Event::Comment(_) => {
                        pending = Some((tag, markup));
                        write_event(&mut writer, event.borrow())?;
                        continue;
                    }
                    Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == tag => {}
                    _ => writer.get_mut().extend_from_slice(markup.as_bytes()),
                }
            }

            let styled = if in_text_body { role } else { None };
            match event {
                Event::Start(ref e) => match (local_name(e.name().as_ref()), styled) {
                    (b"cSld", _) => {
                        write_event(&mut writer, Event::Start(e.borrow()))?;
                        writer.get_mut().extend_from_slice(self.background_xml().as_bytes());
                    }
                    // replaced by the background written after `p:cSld`
                    (b"bg", _) => skip_depth = 1,
                    (b"sp", _) => {
                        role = shapes.next().copied().flatten();
                        in_text_body = false;
                        write_event(&mut writer, Event::Start(e.borrow()))?;
                    }
                    (b"txBody", _) => {
                        in_text_body = true;
                        write_event(&mut writer, Event::Start(e.borrow()))?;
                    }
                    (b"bodyPr", Some(role)) => {
                        write_event(&mut writer, Event::Start(self.body_properties(e, role)))?;
                    }
                    (b"p", Some(role)) => {
                        write_event(&mut writer, Event::Start(e.borrow()))?;
                        pending = Some((&b"pPr"[..], self.paragraph_properties_xml(role)));
                    }
                    (b"r" | b"fld", Some(role)) => {
                        write_event(&mut writer, Event::Start(e.borrow()))?;
                        pending = Some((&b"rPr"[..], self.run_properties_xml(role)));
                    }
                    (b"pPr", Some(role)) => {
                        write_event(&mut writer, Event::Start(restyled_start(e, &self.paragraph_attrs())))?;
                        writer
                            .get_mut()
                            .extend_from_slice(spacing_xml(self.config, role == Role::Body).as_bytes());
                        filter = Some(Filter {
                            depth: 1,
                            keep: |name| !SPACING_TAGS.contains(&name),
                        });
                    }
                    (b"rPr", Some(role)) => {
                        write_event(&mut writer, Event::Start(self.run_start(e, role)))?;
                        writer.get_mut().extend_from_slice(self.run_children_xml(role).as_bytes());
                        filter = Some(Filter {
                            depth: 1,
                            keep: |name| name.starts_with(b"hlink"),
                        });
                    }
                    _ => write_event(&mut writer, Event::Start(e.borrow()))?,
                },
                Event::Empty(ref e) => match (local_name(e.name().as_ref()), styled) {
                    (b"bg", _) => {}
                    (b"bodyPr", Some(role)) => {
                        write_event(&mut writer, Event::Empty(self.body_properties(e, role)))?;
                    }
                    (b"pPr", Some(role)) => {
                        let end = end_of(e);
                        write_event(&mut writer, Event::Start(restyled_start(e, &self.paragraph_attrs())))?;
                        writer
                            .get_mut()
                            .extend_from_slice(spacing_xml(self.config, role == Role::Body).as_bytes());
                        write_event(&mut writer, Event::End(end))?;
                    }
                    (b"rPr", Some(role)) => {
                        let end = end_of(e);
                        write_event(&mut writer, Event::Start(self.run_start(e, role)))?;
                        writer.get_mut().extend_from_slice(self.run_children_xml(role).as_bytes());
                        write_event(&mut writer, Event::End(end))?;
                    }
                    _ => write_event(&mut writer, Event::Empty(e.borrow()))?,
                },
                Event::End(ref e) => {
                    match local_name(e.name().as_ref()) {
                        b"sp" => {
                            role = None;
                            in_text_body = false;
                        }
                        b"txBody" => in_text_body = false,
                        _ => {}
                    }
                    write_event(&mut writer, Event::End(e.borrow()))?;
                }
                _ => write_event(&mut writer, event)?,
            }
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Restyled slide is not UTF-8: {}", e)))
    }

    fn background_xml(&self) -> String {
        format!(
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            self.theme.palette.background.hex()
        )
    }

    /// Wrapping text frame; titles centered vertically, body text from the top with side margins.
    fn body_properties(&self, e: &BytesStart, role: Role) -> BytesStart<'static> {
        let mut attrs = vec![("wrap", "square".to_string()), ("rtlCol", "1".to_string())];
        match role {
            Role::Title => attrs.push(("anchor", "ctr".to_string())),
            Role::Body => {
                attrs.push(("anchor", "t".to_string()));
                attrs.push(("lIns", BODY_INSET_EMU.to_string()));
                attrs.push(("rIns", BODY_INSET_EMU.to_string()));
            }
        }
        restyled_start(e, &attrs)
    }

    fn paragraph_attrs(&self) -> Vec<(&'static str, String)> {
        vec![("algn", "r".to_string()), ("rtl", "1".to_string())]
    }

    /// A complete `a:pPr` for paragraphs that had none.
    fn paragraph_properties_xml(&self, role: Role) -> String {
        format!(
            r#"<a:pPr algn="r" rtl="1">{}</a:pPr>"#,
            spacing_xml(self.config, role == Role::Body)
        )
    }

    /// Attributes of a restyled run. Body runs keep their size and weight
    /// unless the size is missing or too small to read.
    fn run_attrs(&self, existing_size: Option<f64>, role: Role) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("lang", self.config.lang.clone())];
        match role {
            Role::Title => {
                attrs.push(("sz", hundredths(self.config.title_size_pt).to_string()));
                attrs.push(("b", "1".to_string()));
            }
            Role::Body => {
                if existing_size.map_or(true, |pt| pt < MIN_BODY_SIZE_PT) {
                    attrs.push(("sz", hundredths(self.config.body_size_pt).to_string()));
                }
            }
        }
        attrs
    }

    fn run_start(&self, e: &BytesStart, role: Role) -> BytesStart<'static> {
        let existing_size = attr(e, b"sz")
            .and_then(|sz| sz.trim().parse::<u32>().ok())
            .map(|v| f64::from(v) / 100.0);
        restyled_start(e, &self.run_attrs(existing_size, role))
    }

    fn run_children_xml(&self, role: Role) -> String {
        let palette = &self.theme.palette;
        let color = match role {
            Role::Title => palette.primary,
            Role::Body => palette.text,
        };
        run_fill_and_fonts_xml(color, self.theme.primary_font())
    }

    /// A complete `a:rPr` for runs that had none.
    fn run_properties_xml(&self, role: Role) -> String {
        let attrs: String = self
            .run_attrs(None, role)
            .iter()
            .map(|(key, value)| format!(r#" {}="{}""#, key, escape(value.as_str())))
            .collect();
        format!("<a:rPr{}>{}</a:rPr>", attrs, self.run_children_xml(role))
    }
}

/// Copy of a start tag with `overrides` replacing or adding attributes.
fn restyled_start(e: &BytesStart, overrides: &[(&str, String)]) -> BytesStart<'static> {
    let mut out = e.to_owned();
    out.clear_attributes();
    for attribute in e.attributes().flatten() {
        if !overrides.iter().any(|(key, _)| key.as_bytes() == attribute.key.as_ref()) {
            out.push_attribute(attribute);
        }
    }
    for (key, value) in overrides {
        out.push_attribute((*key, value.as_str()));
    }
    out
}

fn end_of(e: &BytesStart) -> BytesEnd<'static> {
    BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned())
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(e.to_string()))
}
