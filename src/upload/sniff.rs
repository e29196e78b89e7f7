//! Content sniffing
//!
//! Classifies a payload by its bytes, never by what the client claims. The
//! classification mirrors the usual browser sniffing order over the first
//! 512 bytes: markup signatures, byte-order marks, binary magic numbers
//! (via `infer`), then a scan for binary control bytes.

pub const SNIFF_LEN: usize = 512;

pub const PLAIN_TEXT_UTF8: &str = "text/plain; charset=utf-8";
pub const PLAIN_TEXT_UTF16BE: &str = "text/plain; charset=utf-16be";
pub const PLAIN_TEXT_UTF16LE: &str = "text/plain; charset=utf-16le";
pub const HTML_UTF8: &str = "text/html; charset=utf-8";
pub const XML_UTF8: &str = "text/xml; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Upper-case signatures matched case-insensitively, each must be followed by ' ' or '>'
const HTML_SIGNATURES: &[&[u8]] = &[
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

const XML_SIGNATURE: &[u8] = b"<?xml";

/// `infer` results backed by the standard sniffing signature table. Any other
/// `infer` hit (two-byte `MZ`, `fLaC` and the like) falls through to the text scan.
const SIGNATURE_TYPES: &[&str] = &[
    "application/pdf",
    "application/postscript",
    "image/gif",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/bmp",
    "image/vnd.microsoft.icon",
    "application/wasm",
    "audio/mpeg",
    "audio/ogg",
    "audio/midi",
    "audio/x-wav",
    "audio/x-aiff",
    "video/x-msvideo",
    "video/mp4",
    "video/webm",
    "application/font-woff",
    "application/font-sfnt",
    "application/gzip",
    "application/zip",
    "application/vnd.rar",
];

/// Returns the MIME classification of `content`
pub fn sniff_content_type(content: &[u8]) -> &'static str {
    let window = &content[..content.len().min(SNIFF_LEN)];

    let markup = skip_leading_whitespace(window);
    if HTML_SIGNATURES.iter().any(|sig| matches_tag(markup, sig)) {
        return HTML_UTF8;
    }
    if markup.starts_with(XML_SIGNATURE) {
        return XML_UTF8;
    }

    if window.starts_with(&[0xFE, 0xFF]) {
        return PLAIN_TEXT_UTF16BE;
    }
    if window.starts_with(&[0xFF, 0xFE]) {
        return PLAIN_TEXT_UTF16LE;
    }
    if window.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return PLAIN_TEXT_UTF8;
    }

    if let Some(kind) = infer::get(window) {
        if SIGNATURE_TYPES.contains(&kind.mime_type()) {
            return kind.mime_type();
        }
    }

    if window.iter().copied().any(is_binary_byte) {
        return OCTET_STREAM;
    }

    PLAIN_TEXT_UTF8
}

fn skip_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn matches_tag(data: &[u8], signature: &[u8]) -> bool {
    if data.len() < signature.len() + 1 {
        return false;
    }
    let (head, rest) = data.split_at(signature.len());
    head.eq_ignore_ascii_case(signature) && matches!(rest[0], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
