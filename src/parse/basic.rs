//! Signature sniffing plus UTF-8 text decoding.

use crate::AttributeSet;
use crate::error::{PackError, Result};

use super::{CONTENT, CONTENT_LENGTH, CONTENT_TYPE, ContentParser};

/// Leading-byte signatures for formats recognized without decoding.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B", "application/gzip"),
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detects the content type from the bytes alone (no filename hint).
///
/// - known binary signature: `Content-Type` set, empty `CONTENT`
/// - valid UTF-8 without NUL bytes: `text/plain` (or `text/html`), body in `CONTENT`
/// - anything else: `ExtractionFailure("unsupported format ...")`
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicParser;

impl BasicParser {
    pub fn new() -> Self {
        Self
    }

    fn sniff_signature(bytes: &[u8]) -> Option<&'static str> {
        SIGNATURES
            .iter()
            .find(|(magic, _)| bytes.starts_with(magic))
            .map(|(_, mime)| *mime)
    }

    fn looks_like_html(text: &str) -> bool {
        let head = text
            .trim_start()
            .chars()
            .take(16)
            .collect::<String>()
            .to_ascii_lowercase();
        head.starts_with("<!doctype html") || head.starts_with("<html")
    }
}

impl ContentParser for BasicParser {
    fn parse(&self, bytes: &[u8]) -> Result<AttributeSet> {
        let mut attrs = AttributeSet::new();
        attrs.set(CONTENT_LENGTH, bytes.len().to_string());

        if let Some(mime) = Self::sniff_signature(bytes) {
            attrs.set(CONTENT_TYPE, mime);
            attrs.set(CONTENT, "");
            return Ok(attrs);
        }

        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(body)
            .ok()
            .filter(|t| !t.contains('\0'))
            .ok_or_else(|| {
                PackError::ExtractionFailure(
                    "unsupported format: no known signature and not UTF-8 text".to_string(),
                )
            })?;
        let mime = if Self::looks_like_html(text) {
            "text/html; charset=UTF-8"
        } else {
            "text/plain; charset=UTF-8"
        };
        attrs.set(CONTENT_TYPE, mime);
        attrs.set(CONTENT, text);
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeValue;

    fn single<'a>(attrs: &'a AttributeSet, name: &str) -> &'a str {
        match attrs.get(name) {
            Some(AttributeValue::Single(v)) => v,
            other => panic!("{name} not single-valued: {other:?}"),
        }
    }

    #[test]
    fn plain_text_goes_to_content() {
        let attrs = BasicParser.parse(b"hello world\n").unwrap();
        assert_eq!(single(&attrs, CONTENT), "hello world\n");
        assert_eq!(single(&attrs, CONTENT_TYPE), "text/plain; charset=UTF-8");
        assert_eq!(single(&attrs, CONTENT_LENGTH), "12");
    }

    #[test]
    fn bom_is_stripped() {
        let attrs = BasicParser.parse(b"\xEF\xBB\xBFabc").unwrap();
        assert_eq!(single(&attrs, CONTENT), "abc");
    }

    #[test]
    fn html_is_detected() {
        let attrs = BasicParser.parse(b"  <!DOCTYPE html><p>x</p>").unwrap();
        assert_eq!(single(&attrs, CONTENT_TYPE), "text/html; charset=UTF-8");
    }

    #[test]
    fn signature_wins_over_text() {
        let attrs = BasicParser.parse(b"%PDF-1.7\n...").unwrap();
        assert_eq!(single(&attrs, CONTENT_TYPE), "application/pdf");
        assert_eq!(single(&attrs, CONTENT), "");
    }

    #[test]
    fn unknown_binary_is_unsupported() {
        let err = BasicParser.parse(&[0x00, 0x9F, 0x92, 0x96]).unwrap_err();
        assert!(matches!(err, PackError::ExtractionFailure(ref r) if r.starts_with("unsupported")));
    }

    #[test]
    fn empty_input_is_empty_text() {
        let attrs = BasicParser.parse(b"").unwrap();
        assert_eq!(single(&attrs, CONTENT), "");
        assert_eq!(single(&attrs, CONTENT_LENGTH), "0");
    }
}
