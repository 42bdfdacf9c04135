//! Text cleanup shared by the extractors, the renderer and the parser.
//!
//! Handles Unicode normalization, whitespace collapsing, paragraph
//! splitting, bullet markers, and HTML escaping in both directions.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of horizontal whitespace into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Regex matching any markup tag.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Characters that open a bulleted line in source documents.
const BULLET_CHARS: &[char] = &['•', '-', '*'];

/// Clean a block of text while keeping its line structure.
///
/// - NFC-normalizes (Hebrew points and composed letters compare equal)
/// - converts CRLF/CR line endings to LF
/// - collapses horizontal whitespace and trims every line
/// - drops blank lines
pub fn clean_block(text: &str) -> String {
    let text: String = text.nfc().collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    text.lines()
        .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split text into trimmed, non-empty paragraphs (one per line).
pub fn split_paragraphs(text: &str) -> Vec<String> {
    clean_block(text).lines().map(str::to_string).collect()
}

/// Rewrite a leading `•`, `-` or `*` marker as `• `.
///
/// Lines without a marker, or consisting only of marker characters, are
/// returned unchanged.
pub fn normalize_bullet(line: &str) -> String {
    let trimmed = line.trim();
    if !trimmed.starts_with(BULLET_CHARS) {
        return trimmed.to_string();
    }

    let rest = trimmed.trim_start_matches(|c: char| BULLET_CHARS.contains(&c) || c == ' ');
    if rest.is_empty() {
        trimmed.to_string()
    } else {
        format!("• {}", rest)
    }
}

/// Escape text for embedding in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode HTML character references.
///
/// Inverse of [`escape_html`]; additionally understands `&nbsp;`, `&apos;`
/// and decimal/hex numeric references. Unknown or malformed references are
/// kept literally.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 32)
            .and_then(|end| decode_reference(&after[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Remove every markup tag, keeping the text between them.
pub fn strip_tags(markup: &str) -> String {
    TAG_REGEX.replace_all(markup, "").into_owned()
}
