//! PPTX writer for slide records.
//!
//! Produces a self-contained package: every slide is a blank-layout slide
//! with a solid background and up to two right-to-left textboxes.

use crate::template;
use deck_core::classify::is_emphasis_paragraph;
use deck_core::config::{BoxGeometry, Labels, Rgb, Theme, WriterConfig};
use deck_core::types::with_placeholder;
use deck_core::{Error, Result, Slide};
use quick_xml::escape::escape;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes slides as a PowerPoint presentation.
pub struct PptxWriter<'a> {
    config: &'a WriterConfig,
    theme: &'a Theme,
    labels: Labels,
    document_title: String,
}

/// Styling for one paragraph's runs.
struct RunStyle<'s> {
    size_pt: f64,
    bold: bool,
    color: Rgb,
    font: &'s str,
    lang: &'s str,
}

impl<'a> PptxWriter<'a> {
    pub fn new(config: &'a WriterConfig, theme: &'a Theme) -> Self {
        Self {
            config,
            theme,
            labels: Labels::default(),
            document_title: String::new(),
        }
    }

    /// Labels used for the placeholder slide of an empty deck.
    pub fn with_labels(mut self, labels: &Labels) -> Self {
        self.labels = labels.clone();
        self
    }

    /// Title recorded in the document properties.
    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = title.into();
        self
    }

    /// Write a presentation file to disk.
    pub fn write_to_path(&self, slides: &[Slide], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(slides, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a presentation to any seekable sink.
    pub fn write<W: Write + Seek>(&self, slides: &[Slide], sink: W) -> Result<()> {
        let slides = with_placeholder(slides, &self.labels);
        let count = slides.len();

        let mut zip = ZipWriter::new(sink);
        let mut put = |name: &str, content: &str| -> Result<()> {
            zip.start_file(name, options()).map_err(zip_error)?;
            zip.write_all(content.as_bytes())?;
            Ok(())
        };

        put("[Content_Types].xml", &template::content_types(count))?;
        put("_rels/.rels", &template::package_rels())?;
        put("docProps/core.xml", &template::core_props(&self.document_title))?;
        put("docProps/app.xml", &template::app_props(count))?;
        put(
            "ppt/presentation.xml",
            &template::presentation(count, self.config.slide_width, self.config.slide_height),
        )?;
        put("ppt/_rels/presentation.xml.rels", &template::presentation_rels(count))?;
        put("ppt/slideMasters/slideMaster1.xml", &template::slide_master())?;
        put("ppt/slideMasters/_rels/slideMaster1.xml.rels", &template::slide_master_rels())?;
        put("ppt/slideLayouts/slideLayout1.xml", &template::slide_layout())?;
        put("ppt/slideLayouts/_rels/slideLayout1.xml.rels", &template::slide_layout_rels())?;
        put("ppt/theme/theme1.xml", &template::theme(self.theme))?;

        for (i, slide) in slides.iter().enumerate() {
            put(&format!("ppt/slides/slide{}.xml", i + 1), &self.slide_xml(slide))?;
            put(&format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), &template::slide_rels())?;
        }

        zip.finish().map_err(zip_error)?;
        log::debug!("wrote {} slides", count);
        Ok(())
    }

    /// Markup of a single slide part.
    fn slide_xml(&self, slide: &Slide) -> String {
        let palette = &self.theme.palette;
        let mut xml = String::with_capacity(4096);
        xml.push_str(template::XML_DECL);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            template::NS_A,
            template::NS_R,
            template::NS_P
        ));
        xml.push_str("<p:cSld>");
        xml.push_str(&format!(
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            palette.background.hex()
        ));
        xml.push_str("<p:spTree>");
        xml.push_str(concat!(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
        ));

        let font = self.theme.primary_font();
        let lang = self.config.lang.as_str();

        if let Some(title) = &slide.title {
            let style = RunStyle {
                size_pt: self.config.title_size_pt,
                bold: true,
                color: palette.primary,
                font,
                lang,
            };
            let paragraph = paragraph_xml(title, &style, "");
            xml.push_str(&textbox_xml(2, "Title", &self.config.title_box, &paragraph));
        }

        if !slide.body.is_empty() {
            let geometry = if slide.title.is_some() {
                &self.config.body_box
            } else {
                &self.config.body_box_untitled
            };
            let spacing = spacing_xml(self.config, true);

            let paragraphs: String = slide
                .body
                .iter()
                .map(|text| {
                    let style = if is_emphasis_paragraph(text) {
                        RunStyle {
                            size_pt: self.config.emphasis_size_pt,
                            bold: true,
                            color: palette.primary,
                            font,
                            lang,
                        }
                    } else {
                        RunStyle {
                            size_pt: self.config.body_size_pt,
                            bold: false,
                            color: palette.text,
                            font,
                            lang,
                        }
                    };
                    paragraph_xml(text, &style, &spacing)
                })
                .collect();
            xml.push_str(&textbox_xml(3, "Content", geometry, &paragraphs));
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

fn options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::ZipError(format!("Failed to write archive: {}", e))
}

pub(crate) fn hundredths(pt: f64) -> i64 {
    (pt * 100.0).round() as i64
}

/// Paragraph spacing children of `a:pPr`: optional line spacing, then space after.
pub(crate) fn spacing_xml(config: &WriterConfig, line_spacing: bool) -> String {
    let mut xml = String::new();
    if line_spacing {
        xml.push_str(&format!(
            r#"<a:lnSpc><a:spcPct val="{}"/></a:lnSpc>"#,
            u64::from(config.line_spacing_pct) * 1000
        ));
    }
    xml.push_str(&format!(
        r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
        hundredths(config.space_after_pt)
    ));
    xml
}

/// Fill and typeface children of `a:rPr`.
pub(crate) fn run_fill_and_fonts_xml(color: Rgb, font: &str) -> String {
    format!(
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{font}"/><a:cs typeface="{font}"/>"#,
        color.hex(),
        font = escape(font),
    )
}

/// A wrapping, non-autofit textbox holding prebuilt paragraphs.
fn textbox_xml(id: u32, name: &str, geometry: &BoxGeometry, paragraphs: &str) -> String {
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="1"><a:noAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#
        ),
        id, name, geometry.x, geometry.y, geometry.cx, geometry.cy, paragraphs
    )
}

/// One right-aligned RTL paragraph; embedded newlines become `a:br`.
fn paragraph_xml(text: &str, style: &RunStyle, spacing: &str) -> String {
    let rpr = format!(
        r#"<a:rPr lang="{}" sz="{}" b="{}" dirty="0">{}</a:rPr>"#,
        escape(style.lang),
        hundredths(style.size_pt),
        if style.bold { 1 } else { 0 },
        run_fill_and_fonts_xml(style.color, style.font),
    );

    let mut xml = format!(r#"<a:p><a:pPr algn="r" rtl="1">{}</a:pPr>"#, spacing);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str(&format!("<a:br>{}</a:br>", rpr));
        }
        xml.push_str(&format!("<a:r>{}<a:t>{}</a:t></a:r>", rpr, escape(line)));
    }
    xml.push_str("</a:p>");
    xml
}
