//! Fixed package parts for generated presentations.
//!
//! A generated deck has one slide master, one blank layout and one theme;
//! only the theme colors and fonts vary between runs.

use deck_core::config::Theme;
use quick_xml::escape::escape;

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// `[Content_Types].xml` for a package with `slide_count` slides.
pub(crate) fn content_types(slide_count: usize) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        ));
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

/// A relationships part from `(id, type, target)` triples.
pub(crate) fn relationships(rels: &[(String, &str, String)]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, NS_PKG_RELS));
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// `_rels/.rels`
pub(crate) fn package_rels() -> String {
    relationships(&[
        ("rId1".into(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".into()),
        ("rId2".into(), REL_CORE_PROPS, "docProps/core.xml".into()),
        ("rId3".into(), REL_EXTENDED_PROPS, "docProps/app.xml".into()),
    ])
}

pub(crate) fn core_props(title: &str) -> String {
    format!(
        concat!(
            r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>deck</dc:creator></cp:coreProperties>"
        ),
        XML_DECL,
        escape(title)
    )
}

pub(crate) fn app_props(slide_count: usize) -> String {
    format!(
        concat!(
            r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            "<Application>deck</Application><Slides>{}</Slides></Properties>"
        ),
        XML_DECL, slide_count
    )
}

/// `ppt/presentation.xml`; slide relationships are `rId2..` after the master.
pub(crate) fn presentation(slide_count: usize, width: i64, height: i64) -> String {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    ));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for i in 0..slide_count {
        xml.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str(&format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, width, height));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

pub(crate) fn presentation_rels(slide_count: usize) -> String {
    let mut rels = vec![(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    for n in 1..=slide_count {
        rels.push((format!("rId{}", n + 1), REL_SLIDE, format!("slides/slide{}.xml", n)));
    }
    rels.push((format!("rId{}", slide_count + 2), REL_THEME, "theme/theme1.xml".to_string()));
    relationships(&rels)
}

const EMPTY_TREE: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

pub(crate) fn slide_master() -> String {
    format!(
        concat!(
            r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            "<p:cSld><p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_TREE
    )
}

pub(crate) fn slide_master_rels() -> String {
    relationships(&[
        ("rId1".into(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".into()),
        ("rId2".into(), REL_THEME, "../theme/theme1.xml".into()),
    ])
}

pub(crate) fn slide_layout() -> String {
    format!(
        concat!(
            r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_TREE
    )
}

pub(crate) fn slide_layout_rels() -> String {
    relationships(&[(
        "rId1".into(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".into(),
    )])
}

/// Relationships of every generated slide: just the blank layout.
pub(crate) fn slide_rels() -> String {
    relationships(&[(
        "rId1".into(),
        REL_SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml".into(),
    )])
}

/// `ppt/theme/theme1.xml` built from the deck palette and primary font.
pub(crate) fn theme(theme: &Theme) -> String {
    let p = &theme.palette;
    let font = escape(theme.primary_font());
    let srgb = |name: &str, hex: String| format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, hex);

    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{}" name="Deck">"#, NS_A));
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Deck">"#);
    xml.push_str(&srgb("dk1", p.text.hex()));
    xml.push_str(&srgb("lt1", p.background.hex()));
    xml.push_str(&srgb("dk2", p.primary.hex()));
    xml.push_str(&srgb("lt2", "F5F7FA".into()));
    xml.push_str(&srgb("accent1", p.primary.hex()));
    xml.push_str(&srgb("accent2", p.secondary.hex()));
    xml.push_str(&srgb("accent3", p.accent.hex()));
    xml.push_str(&srgb("accent4", p.text_light.hex()));
    xml.push_str(&srgb("accent5", p.secondary.hex()));
    xml.push_str(&srgb("accent6", p.accent.hex()));
    xml.push_str(&srgb("hlink", p.secondary.hex()));
    xml.push_str(&srgb("folHlink", p.primary.hex()));
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Deck">"#);
    for slot in ["majorFont", "minorFont"] {
        xml.push_str(&format!(
            r#"<a:{0}><a:latin typeface="{1}"/><a:ea typeface=""/><a:cs typeface="{1}"/></a:{0}>"#,
            slot, font
        ));
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Deck"><a:fillStyleLst>"#);
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for w in [6350, 12700, 19050] {
        xml.push_str(&format!(
            r#"<a:ln w="{}"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
            w
        ));
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements></a:theme>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_lists_slides_after_master() {
        let xml = presentation(2, 9_144_000, 6_858_000);
        assert!(xml.contains(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));

        let rels = presentation_rels(2);
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml""#));
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    }

    #[test]
    fn test_content_types_cover_slides() {
        let xml = content_types(3);
        assert!(xml.contains("/ppt/slides/slide3.xml"));
        assert!(!xml.contains("/ppt/slides/slide4.xml"));
    }

    #[test]
    fn test_theme_uses_palette_and_font() {
        let mut t = Theme::default();
        t.fonts = vec!["Heebo & Co".into()];
        let xml = theme(&t);
        assert!(xml.contains(&format!(r#"<a:accent1><a:srgbClr val="{}"/></a:accent1>"#, t.palette.primary.hex())));
        assert!(xml.contains(r#"<a:latin typeface="Heebo &amp; Co"/>"#));
    }

    #[test]
    fn test_core_props_escapes_title() {
        assert!(core_props("a < b").contains("<dc:title>a &lt; b</dc:title>"));
    }
}
