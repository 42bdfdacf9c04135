//! Self-contained HTML presentation output.
//!
//! The generated document carries its own stylesheet and navigation script;
//! the only external reference is the optional logo image.
//!
//! # Markup contract
//!
//! [`crate::parse::HtmlSlideParser`] reads this markup back, so the renderer
//! guarantees:
//!
//! - one `<div class="slide" id="slide<N>" data-index="<N>">` per slide, `N`
//!   0-based and sequential; only the first also carries `active`
//! - at most one `<h1 class="slide-title">…</h1>` per slide, on one line, with
//!   line breaks in the title written as `<br>`
//! - a `<div class="slide-body">` holding one `<p>…</p>` per body paragraph,
//!   in order, present only when the body is non-empty; sub-heading
//!   paragraphs are written as `<p class="emphasis">`
//! - all text escaped with [`escape_html`]; no `<p>` outside slide bodies

use crate::classify::is_emphasis_paragraph;
use crate::config::{RenderConfig, Theme};
use crate::text::escape_html;
use crate::types::{with_placeholder, Slide};
use std::fmt::Write;

/// Renders slides into a single static HTML document.
#[derive(Debug, Clone)]
pub struct HtmlRenderer<'a> {
    config: &'a RenderConfig,
    theme: &'a Theme,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(config: &'a RenderConfig, theme: &'a Theme) -> Self {
        Self { config, theme }
    }

    /// Render the slides; an empty slice yields one placeholder slide.
    pub fn render(&self, slides: &[Slide]) -> String {
        let slides = with_placeholder(slides, &self.config.labels);
        let mut html = String::with_capacity(16 * 1024 + slides.len() * 512);

        self.write_head(&mut html);
        self.write_chrome(&mut html);

        html.push_str("    <div class=\"presentation-container\">\n");
        html.push_str("        <div class=\"slide-container\">\n");
        for (idx, slide) in slides.iter().enumerate() {
            write_slide(&mut html, idx, slide);
        }
        html.push_str("        </div>\n");
        html.push_str("    </div>\n\n");

        self.write_controls(&mut html);
        self.write_script(&mut html);
        html.push_str("</body>\n</html>\n");

        html
    }

    fn write_head(&self, html: &mut String) {
        let palette = &self.theme.palette;
        let style = STYLESHEET
            .replace("%FONTS%", &self.theme.css_font_stack())
            .replace("%PRIMARY%", &palette.primary.to_string())
            .replace("%SECONDARY%", &palette.secondary.to_string())
            .replace("%ACCENT%", &palette.accent.to_string())
            .replace("%BACKGROUND%", &palette.background.to_string())
            .replace("%TEXT%", &palette.text.to_string())
            .replace("%TEXT_LIGHT%", &palette.text_light.to_string());

        let _ = write!(
            html,
            "<!DOCTYPE html>\n\
             <html lang=\"{lang}\" dir=\"rtl\">\n\
             <head>\n    \
             <meta charset=\"UTF-8\">\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
             <title>{title}</title>\n    \
             <style>\n{style}    </style>\n\
             </head>\n",
            lang = escape_html(&self.config.lang),
            title = escape_html(&self.config.document_title),
            style = style,
        );
    }

    fn write_chrome(&self, html: &mut String) {
        html.push_str("<body>\n");
        if let Some(logo) = &self.config.logo {
            let _ = writeln!(
                html,
                "    <div class=\"logo\"><img src=\"{}\" alt=\"{}\"></div>",
                escape_html(&logo.src),
                escape_html(&logo.alt)
            );
        }
        html.push_str("    <div class=\"progress-bar\" id=\"progressBar\"></div>\n");
        html.push_str("    <div class=\"slide-counter\" id=\"slideCounter\"></div>\n");
        if self.config.show_thumbnails {
            html.push_str("    <div class=\"slide-thumbnails\" id=\"thumbnails\"></div>\n");
        }
        html.push('\n');
    }

    fn write_controls(&self, html: &mut String) {
        let labels = &self.config.labels;
        let _ = write!(
            html,
            "    <div class=\"controls\">\n        \
             <button class=\"btn\" id=\"prevBtn\" onclick=\"previousSlide()\">{prev}</button>\n        \
             <button class=\"btn\" id=\"nextBtn\" onclick=\"nextSlide()\">{next}</button>\n    \
             </div>\n\n    \
             <div class=\"keyboard-hint\" id=\"keyboardHint\">{hint}</div>\n\n",
            prev = escape_html(&labels.previous),
            next = escape_html(&labels.next),
            hint = escape_html(&labels.keyboard_hint),
        );
    }

    fn write_script(&self, html: &mut String) {
        let script = SCRIPT
            .replace("%SWIPE_THRESHOLD%", &self.config.swipe_threshold_px.to_string())
            .replace("%HINT_TIMEOUT%", &self.config.hint_timeout_ms.to_string());
        let _ = write!(html, "    <script>\n{}    </script>\n", script);
    }
}

fn write_slide(html: &mut String, idx: usize, slide: &Slide) {
    let class = if idx == 0 { "slide active" } else { "slide" };
    let _ = writeln!(
        html,
        "            <div class=\"{}\" id=\"slide{}\" data-index=\"{}\">",
        class, idx, idx
    );

    if let Some(title) = &slide.title {
        let _ = writeln!(
            html,
            "                <h1 class=\"slide-title\">{}</h1>",
            escape_multiline(title)
        );
    }

    if !slide.body.is_empty() {
        html.push_str("                <div class=\"slide-body\">\n");
        for paragraph in &slide.body {
            let class = if is_emphasis_paragraph(paragraph) {
                " class=\"emphasis\""
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "                    <p{}>{}</p>",
                class,
                escape_multiline(paragraph)
            );
        }
        html.push_str("                </div>\n");
    }

    html.push_str("            </div>\n");
}

/// Escape text and turn its line breaks into `<br>`.
fn escape_multiline(text: &str) -> String {
    text.split('\n')
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>")
}

const STYLESHEET: &str = r#"        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: %FONTS%;
            background: linear-gradient(135deg, #f5f8fa 0%, %BACKGROUND% 100%);
            color: %TEXT%;
            direction: rtl;
            overflow: hidden;
            height: 100vh;
        }

        .presentation-container {
            width: 100%;
            height: 100vh;
            display: flex;
            flex-direction: column;
            position: relative;
        }

        .slide-container {
            flex: 1;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 40px;
            margin: 20px;
            overflow-y: auto;
        }

        .slide {
            max-width: 1200px;
            width: 100%;
            padding: 60px;
            background: %BACKGROUND%;
            border: 2px solid #dce6f0;
            border-radius: 12px;
            box-shadow: 0 8px 32px rgba(0, 51, 102, 0.1);
            display: none;
        }

        .slide.active {
            display: block;
            animation: slideIn 0.5s ease-out;
        }

        @keyframes slideIn {
            from { opacity: 0; transform: translateX(30px); }
            to { opacity: 1; transform: translateX(0); }
        }

        .slide-title {
            font-size: 48px;
            font-weight: bold;
            color: %PRIMARY%;
            margin-bottom: 40px;
            padding-bottom: 20px;
            border-bottom: 3px solid %SECONDARY%;
            text-align: right;
            line-height: 1.3;
        }

        .slide-body {
            font-size: 24px;
            color: %TEXT%;
            line-height: 1.8;
            text-align: right;
        }

        .slide-body p {
            margin-bottom: 20px;
            padding-right: 20px;
            border-right: 3px solid transparent;
            transition: all 0.3s ease;
        }

        .slide-body p:hover {
            border-right-color: %SECONDARY%;
        }

        .slide-body p.emphasis {
            font-size: 28px;
            font-weight: bold;
            color: %PRIMARY%;
            margin-top: 30px;
        }

        .controls {
            position: fixed;
            bottom: 30px;
            left: 50%;
            transform: translateX(-50%);
            display: flex;
            gap: 15px;
            z-index: 1000;
            background: rgba(255, 255, 255, 0.95);
            padding: 15px 30px;
            border-radius: 50px;
            box-shadow: 0 4px 20px rgba(0, 0, 0, 0.2);
        }

        .btn {
            background: %PRIMARY%;
            color: white;
            border: none;
            padding: 12px 24px;
            font-size: 16px;
            font-family: %FONTS%;
            border-radius: 25px;
            cursor: pointer;
            transition: all 0.3s ease;
            font-weight: bold;
        }

        .btn:hover {
            background: %SECONDARY%;
            transform: translateY(-2px);
        }

        .btn:disabled {
            background: #cccccc;
            cursor: not-allowed;
            transform: none;
        }

        .slide-counter {
            position: fixed;
            top: 30px;
            left: 30px;
            background: %PRIMARY%;
            color: white;
            padding: 10px 20px;
            border-radius: 25px;
            font-size: 16px;
            font-weight: bold;
            z-index: 1000;
        }

        .progress-bar {
            position: fixed;
            top: 0;
            left: 0;
            height: 4px;
            width: 0;
            background: %SECONDARY%;
            transition: width 0.3s ease;
            z-index: 1001;
        }

        .slide-thumbnails {
            position: fixed;
            top: 50%;
            right: 20px;
            transform: translateY(-50%);
            display: flex;
            flex-direction: column;
            gap: 8px;
            max-height: 70vh;
            overflow-y: auto;
            padding: 10px;
            background: rgba(255, 255, 255, 0.9);
            border-radius: 15px;
            z-index: 999;
        }

        .thumbnail {
            width: 48px;
            height: 36px;
            display: flex;
            align-items: center;
            justify-content: center;
            border-radius: 8px;
            border: 2px solid transparent;
            background: #f0f0f0;
            color: %TEXT_LIGHT%;
            font-size: 12px;
            cursor: pointer;
        }

        .thumbnail.active {
            border-color: %ACCENT%;
            color: %PRIMARY%;
            font-weight: bold;
        }

        .keyboard-hint {
            position: fixed;
            bottom: 100px;
            left: 50%;
            transform: translateX(-50%);
            background: rgba(0, 0, 0, 0.7);
            color: white;
            padding: 10px 20px;
            border-radius: 20px;
            font-size: 14px;
            opacity: 0.7;
            transition: opacity 0.5s ease;
        }

        .logo {
            position: fixed;
            top: 30px;
            right: 30px;
            width: 120px;
            z-index: 1000;
            opacity: 0.9;
        }

        .logo img {
            width: 100%;
            height: auto;
            border-radius: 8px;
        }

        @media (max-width: 768px) {
            .slide { padding: 30px; }
            .slide-title { font-size: 36px; }
            .slide-body { font-size: 20px; }
            .slide-thumbnails { display: none; }
            .btn { padding: 10px 18px; font-size: 14px; }
        }
"#;

const SCRIPT: &str = r#"        const slides = document.querySelectorAll('.slide');
        const totalSlides = slides.length;
        let currentSlide = 0;

        function updateSlide() {
            slides.forEach((slide, index) => {
                slide.classList.toggle('active', index === currentSlide);
            });

            document.getElementById('slideCounter').textContent = `${currentSlide + 1} / ${totalSlides}`;
            document.getElementById('progressBar').style.width = ((currentSlide + 1) / totalSlides) * 100 + '%';
            document.getElementById('prevBtn').disabled = currentSlide === 0;
            document.getElementById('nextBtn').disabled = currentSlide === totalSlides - 1;
            updateThumbnails();
        }

        function updateThumbnails() {
            const rail = document.getElementById('thumbnails');
            if (!rail) {
                return;
            }
            rail.innerHTML = '';
            slides.forEach((slide, index) => {
                const thumb = document.createElement('div');
                thumb.className = 'thumbnail' + (index === currentSlide ? ' active' : '');
                thumb.textContent = index + 1;
                thumb.onclick = () => goToSlide(index);
                rail.appendChild(thumb);
            });
        }

        function goToSlide(index) {
            if (index >= 0 && index < totalSlides) {
                currentSlide = index;
                updateSlide();
            }
        }

        function nextSlide() {
            goToSlide(currentSlide + 1);
        }

        function previousSlide() {
            goToSlide(currentSlide - 1);
        }

        document.addEventListener('keydown', (e) => {
            if (e.key === 'ArrowRight' || e.key === 'ArrowDown' || e.key === ' ') {
                e.preventDefault();
                nextSlide();
            } else if (e.key === 'ArrowLeft' || e.key === 'ArrowUp') {
                e.preventDefault();
                previousSlide();
            } else if (e.key === 'Home') {
                goToSlide(0);
            } else if (e.key === 'End') {
                goToSlide(totalSlides - 1);
            }
        });

        let touchStartX = 0;
        document.addEventListener('touchstart', (e) => {
            touchStartX = e.changedTouches[0].screenX;
        });
        document.addEventListener('touchend', (e) => {
            const diff = touchStartX - e.changedTouches[0].screenX;
            if (Math.abs(diff) > %SWIPE_THRESHOLD%) {
                if (diff > 0) {
                    nextSlide();
                } else {
                    previousSlide();
                }
            }
        });

        let wheelLocked = false;
        document.addEventListener('wheel', (e) => {
            if (wheelLocked || e.deltaY === 0) {
                return;
            }
            wheelLocked = true;
            setTimeout(() => { wheelLocked = false; }, 400);
            if (e.deltaY > 0) {
                nextSlide();
            } else {
                previousSlide();
            }
        }, { passive: true });

        updateSlide();

        setTimeout(() => {
            const hint = document.getElementById('keyboardHint');
            hint.style.opacity = '0';
            setTimeout(() => { hint.style.display = 'none'; }, 500);
        }, %HINT_TIMEOUT%);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Logo;

    fn render(slides: &[Slide]) -> String {
        let config = RenderConfig::default();
        let theme = Theme::default();
        HtmlRenderer::new(&config, &theme).render(slides)
    }

    #[test]
    fn test_document_shell() {
        let html = render(&[Slide::new(Some("כותרת".into()), vec![])]);
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"he\" dir=\"rtl\">"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("color: #003366;"));
        assert!(html.contains("font-family: 'Arial Hebrew', 'David'"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(!html.contains("%PRIMARY%"));
        assert!(!html.contains("%SWIPE_THRESHOLD%"));
    }

    #[test]
    fn test_deterministic() {
        let slides = vec![
            Slide::new(Some("א".into()), vec!["ב".into()]),
            Slide::new(None, vec!["ג".into()]),
        ];
        assert_eq!(render(&slides), render(&slides));
    }

    #[test]
    fn test_first_slide_active_and_sequential_ids() {
        let slides = vec![
            Slide::new(Some("one".into()), vec![]),
            Slide::new(Some("two".into()), vec![]),
            Slide::new(Some("three".into()), vec![]),
        ];
        let html = render(&slides);

        assert_eq!(html.matches("class=\"slide active\"").count(), 1);
        assert!(html.contains("<div class=\"slide active\" id=\"slide0\" data-index=\"0\">"));
        assert!(html.contains("<div class=\"slide\" id=\"slide1\" data-index=\"1\">"));
        assert!(html.contains("<div class=\"slide\" id=\"slide2\" data-index=\"2\">"));
    }

    #[test]
    fn test_title_and_five_paragraphs_in_order() {
        let body: Vec<String> = (1..=5).map(|i| format!("פסקה {}", i)).collect();
        let html = render(&[Slide::new(Some("כותרת".into()), body.clone())]);

        assert_eq!(html.matches("<h1 class=\"slide-title\">").count(), 1);
        assert_eq!(html.matches("<p>").count(), 5);

        let positions: Vec<usize> = body
            .iter()
            .map(|p| html.find(&format!("<p>{}</p>", p)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let title_pos = html.find("<h1 class=\"slide-title\">").unwrap();
        assert!(title_pos < positions[0]);
    }

    #[test]
    fn test_special_characters_escaped() {
        let html = render(&[Slide::new(
            Some(r#"<script>"x" & 'y'</script>"#.into()),
            vec!["a < b".into()],
        )]);

        assert!(html.contains(
            "<h1 class=\"slide-title\">&lt;script&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/script&gt;</h1>"
        ));
        assert!(html.contains("<p>a &lt; b</p>"));
    }

    #[test]
    fn test_empty_input_renders_placeholder() {
        let html = render(&[]);
        let labels = RenderConfig::default().labels;

        assert_eq!(html.matches("id=\"slide").count(), 1);
        assert!(html.contains("id=\"slide0\""));
        assert!(html.contains(&format!(
            "<h1 class=\"slide-title\">{}</h1>",
            escape_html(&labels.placeholder_title)
        )));
        assert!(html.contains(&format!("<p>{}</p>", escape_html(&labels.placeholder_body))));
    }

    #[test]
    fn test_emphasis_paragraphs_are_marked() {
        let html = render(&[Slide::new(
            Some("סיכום".into()),
            vec!["בעיות קיימות:".into(), "40%".into(), "פסקה רגילה".into()],
        )]);

        assert!(html.contains("<p class=\"emphasis\">בעיות קיימות:</p>"));
        assert!(html.contains("<p class=\"emphasis\">40%</p>"));
        assert!(html.contains("<p>פסקה רגילה</p>"));
        assert!(html.contains(".slide-body p.emphasis {"));
    }

    #[test]
    fn test_multiline_title_uses_br() {
        let html = render(&[Slide::new(Some("line one\nline <two>".into()), vec![])]);
        assert!(html.contains("<h1 class=\"slide-title\">line one<br>line &lt;two&gt;</h1>"));
    }

    #[test]
    fn test_slide_without_body_has_no_body_div() {
        let html = render(&[Slide::new(Some("only title".into()), vec![])]);
        assert!(!html.contains("<div class=\"slide-body\">"));
    }

    #[test]
    fn test_optional_logo_and_thumbnails() {
        let theme = Theme::default();
        let mut config = RenderConfig::default();
        let slides = [Slide::new(Some("t".into()), vec![])];

        let html = HtmlRenderer::new(&config, &theme).render(&slides);
        assert!(!html.contains("<div class=\"logo\">"));
        assert!(html.contains("id=\"thumbnails\""));

        config.logo = Some(Logo {
            src: "logo.png".into(),
            alt: "לוגו".into(),
        });
        config.show_thumbnails = false;
        let html = HtmlRenderer::new(&config, &theme).render(&slides);
        assert!(html.contains("<div class=\"logo\"><img src=\"logo.png\" alt=\"לוגו\"></div>"));
        assert!(!html.contains("id=\"thumbnails\""));
    }
}
