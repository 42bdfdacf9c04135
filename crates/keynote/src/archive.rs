//! Opportunistic text recovery from the `.iwa` streams of a Keynote archive.
//!
//! The streams are protobuf messages behind iWork's Snappy framing. We undo
//! the framing and look for runs of Hebrew text in the raw message bytes;
//! the messages themselves are never decoded.

use deck_core::{text, Error, Result};
use regex::Regex;
use snap::raw::Decoder;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::LazyLock;
use zip::ZipArchive;

/// A Hebrew letter followed by Hebrew, word characters, whitespace or punctuation.
static HEBREW_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[א-ת][א-ת\s\w.,:;!?()\-•]*").unwrap());

/// Undo iWork Snappy framing.
///
/// Each chunk is a type byte (always 0), a 24-bit little-endian length, and
/// that many bytes of raw Snappy data.
pub fn decode_iwa(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new();
    let mut decoded = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        if rest.len() < 4 {
            return Err(Error::KeynoteError(format!(
                "truncated chunk header ({} bytes)",
                rest.len()
            )));
        }
        let chunk_type = rest[0];
        if chunk_type != 0 {
            return Err(Error::KeynoteError(format!(
                "unexpected chunk type {}, expected 0",
                chunk_type
            )));
        }
        let length = u32::from_le_bytes([rest[1], rest[2], rest[3], 0]) as usize;
        rest = &rest[4..];
        if rest.len() < length {
            return Err(Error::KeynoteError(format!(
                "chunk of {} bytes exceeds remaining {}",
                length,
                rest.len()
            )));
        }

        let (chunk, tail) = rest.split_at(length);
        if !chunk.is_empty() {
            let bytes = decoder
                .decompress_vec(chunk)
                .map_err(|e| Error::KeynoteError(format!("Snappy decompression failed: {}", e)))?;
            decoded.extend(bytes);
        }
        rest = tail;
    }

    Ok(decoded)
}

/// Find Hebrew text runs of at least `min_chars` characters.
///
/// Runs are whitespace-collapsed onto one line and deduplicated in order of
/// first appearance.
pub fn scan_hebrew_runs(haystack: &str, min_chars: usize, seen: &mut HashSet<String>) -> Vec<String> {
    HEBREW_RUN_REGEX
        .find_iter(haystack)
        .map(|m| text::clean_block(m.as_str()).replace('\n', " "))
        .filter(|run| run.chars().count() >= min_chars)
        .filter(|run| seen.insert(run.clone()))
        .collect()
}

/// Scan a `.key` file (ZIP) or package directory for text runs.
pub fn scan_path(path: &Path, min_chars: usize) -> Result<Vec<String>> {
    if path.is_dir() {
        return scan_directory(path, min_chars);
    }
    let file = File::open(path)?;
    scan_archive(BufReader::new(file), min_chars)
}

/// Scan every `Index/*.iwa` entry of a Keynote ZIP.
pub fn scan_archive<R: Read + Seek>(reader: R, min_chars: usize) -> Result<Vec<String>> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_index_stream(name))
        .map(str::to_string)
        .collect();
    names.sort_by(|a, b| stream_order(a).cmp(&stream_order(b)).then_with(|| a.cmp(b)));

    let mut seen = HashSet::new();
    let mut runs = Vec::new();
    for name in &names {
        let mut data = Vec::new();
        match archive.by_name(name) {
            Ok(mut file) => {
                if let Err(e) = file.read_to_end(&mut data) {
                    log::warn!("Skipping {}: {}", name, e);
                    continue;
                }
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", name, e);
                continue;
            }
        }
        runs.extend(scan_stream(name, &data, min_chars, &mut seen));
    }

    log::debug!("archive scan: {} streams, {} text runs", names.len(), runs.len());
    Ok(runs)
}

fn scan_directory(path: &Path, min_chars: usize) -> Result<Vec<String>> {
    let index = path.join("Index");
    let mut files: Vec<_> = fs::read_dir(&index)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("iwa"))
        .collect();
    files.sort_by(|a, b| {
        let (a, b) = (a.to_string_lossy(), b.to_string_lossy());
        stream_order(&a).cmp(&stream_order(&b)).then_with(|| a.cmp(&b))
    });

    let mut seen = HashSet::new();
    let mut runs = Vec::new();
    for file in &files {
        let name = file.to_string_lossy();
        match fs::read(file) {
            Ok(data) => runs.extend(scan_stream(&name, &data, min_chars, &mut seen)),
            Err(e) => log::warn!("Skipping {}: {}", name, e),
        }
    }
    Ok(runs)
}

fn scan_stream(name: &str, data: &[u8], min_chars: usize, seen: &mut HashSet<String>) -> Vec<String> {
    match decode_iwa(data) {
        Ok(decoded) => scan_hebrew_runs(&String::from_utf8_lossy(&decoded), min_chars, seen),
        Err(e) => {
            log::warn!("Skipping {}: {}", name, e);
            Vec::new()
        }
    }
}

fn is_index_stream(name: &str) -> bool {
    name.starts_with("Index/") && name.ends_with(".iwa")
}

/// Document stream first, then slides by number, then everything else.
fn stream_order(name: &str) -> (u8, usize) {
    let stem = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .trim_end_matches(".iwa");
    if stem == "Document" {
        return (0, 0);
    }
    if let Some(rest) = stem.strip_prefix("Slide") {
        let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse() {
            return (1, n);
        }
    }
    (2, 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use snap::raw::Encoder;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Frame `payload` the way iWork does, in chunks of at most `chunk` bytes.
    pub(crate) fn frame(payload: &[u8], chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for piece in payload.chunks(chunk) {
            let compressed = Encoder::new().compress_vec(piece).unwrap();
            let len = compressed.len() as u32;
            out.push(0);
            out.extend_from_slice(&len.to_le_bytes()[..3]);
            out.extend(compressed);
        }
        out
    }

    pub(crate) fn build_key(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_decode_multi_chunk() {
        let payload = "\x08\x01\x12ספריה דיגיטלית חכמה\x1a\x00".repeat(20);
        let decoded = decode_iwa(&frame(payload.as_bytes(), 64)).unwrap();
        assert_eq!(decoded, payload.as_bytes());
    }

    #[test]
    fn test_decode_rejects_bad_framing() {
        assert!(decode_iwa(&[1, 0, 0, 0]).is_err());
        assert!(decode_iwa(&[0, 10, 0, 0, 1]).is_err());
        assert!(decode_iwa(&[0, 0]).is_err());
        assert!(decode_iwa(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_scan_hebrew_runs() {
        let mut seen = HashSet::new();
        let haystack = "\u{1}\u{2}ספריה דיגיטלית\u{0}abc\u{3}אב\u{4}ספריה דיגיטלית\u{5}חיפוש: מהיר, חכם\u{6}";
        assert_eq!(
            scan_hebrew_runs(haystack, 4, &mut seen),
            vec!["ספריה דיגיטלית", "חיפוש: מהיר, חכם"]
        );
        // already seen
        assert!(scan_hebrew_runs("ספריה דיגיטלית", 4, &mut seen).is_empty());
    }

    #[test]
    fn test_scan_archive_orders_streams_and_skips_bad_ones() {
        let data = build_key(&[
            ("Index/Slide-2.iwa", frame("\x12שקופית שנייה\x00".as_bytes(), 1024)),
            ("Index/Document.iwa", frame("\x12כותרת המסמך\x00".as_bytes(), 1024)),
            ("Index/Slide-1.iwa", frame("\x12שקופית ראשונה\x00".as_bytes(), 1024)),
            ("Index/Broken.iwa", vec![7, 7, 7, 7]),
            ("Data/image.png", vec![0x89, b'P', b'N', b'G']),
        ]);

        let runs = scan_archive(Cursor::new(data), 4).unwrap();
        assert_eq!(runs, vec!["כותרת המסמך", "שקופית ראשונה", "שקופית שנייה"]);
    }

    #[test]
    fn test_stream_order() {
        assert!(stream_order("Index/Document.iwa") < stream_order("Index/Slide-1.iwa"));
        assert!(stream_order("Index/Slide-2.iwa") < stream_order("Index/Slide-10.iwa"));
        assert!(stream_order("Index/Slide-10.iwa") < stream_order("Index/Metadata.iwa"));
    }
}
