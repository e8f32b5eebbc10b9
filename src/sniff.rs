//! Content-type detection for response bodies.
//!
//! When a handler writes a body without ever setting `Content-Type`, the
//! recorder assigns one by sniffing the written bytes, following the
//! signature-table approach of the WHATWG mime-sniffing algorithm: byte
//! order marks, markup prefixes, magic numbers, then a text-vs-binary
//! fallback. Only the first 512 bytes are ever examined.

const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Guesses a content type for `data`.
///
/// Always returns a valid MIME type; `application/octet-stream` when nothing
/// more specific matches. Empty input sniffs as plain text.
pub(crate) fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some(ct) = match_bom(data) {
        return ct;
    }
    if let Some(ct) = match_markup(skip_leading_ws(data)) {
        return ct;
    }
    for (sig, ct) in EXACT_SIGNATURES {
        if data.starts_with(sig) {
            return ct;
        }
    }
    // RIFF containers share a prefix; the format tag sits at offset 8.
    if data.starts_with(b"RIFF") && data.len() >= 12 {
        match &data[8..12] {
            b"WEBP" => return "image/webp",
            b"WAVE" => return "audio/wave",
            _ => {}
        }
    }

    if data.iter().all(|&b| !is_binary_byte(b)) {
        TEXT_PLAIN
    } else {
        "application/octet-stream"
    }
}

const EXACT_SIGNATURES: [(&[u8], &str); 11] = [
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"ID3", "audio/mpeg"),
    (b"OggS", "application/ogg"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
];

/// Tags that identify HTML when followed by a space or `>`.
const HTML_TAGS: [&[u8]; 17] = [
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

fn match_bom(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFE, 0xFF]) {
        Some("text/plain; charset=utf-16be")
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some("text/plain; charset=utf-16le")
    } else if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(TEXT_PLAIN)
    } else {
        None
    }
}

fn match_markup(data: &[u8]) -> Option<&'static str> {
    for tag in HTML_TAGS {
        if let Some(rest) = strip_prefix_ci(data, tag) {
            if matches!(rest.first(), Some(b' ') | Some(b'>')) {
                return Some(TEXT_HTML);
            }
        }
    }
    if data.starts_with(b"<?xml") {
        return Some("text/xml; charset=utf-8");
    }
    None
}

fn strip_prefix_ci<'a>(data: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    if data.len() < prefix.len() {
        return None;
    }
    let (head, rest) = data.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(rest)
}

fn skip_leading_ws(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Bytes that never occur in plain text. Tab, LF, FF, CR and ESC are text.
fn is_binary_byte(b: u8) -> bool {
    b <= 0x08 || b == 0x0B || (0x0E..=0x1A).contains(&b) || (0x1C..=0x1F).contains(&b)
}
