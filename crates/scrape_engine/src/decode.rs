use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use regex::bytes::Regex;

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_LIMIT: usize = 4096;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#)
        .expect("meta charset regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
    /// True when malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Decode page bytes into UTF-8 text using: BOM -> Content-Type charset ->
/// `<meta charset>` -> chardetng guess.
///
/// Malformed input never fails the page; it is replaced and flagged `lossy`.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> DecodedPage {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    if let Some(enc) = charset_from_meta(bytes) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
    })
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let caps = META_CHARSET.captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedPage {
    let (text, _, had_errors) = enc.decode(bytes);
    DecodedPage {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
        lossy: had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_charset_is_case_insensitive() {
        assert_eq!(
            charset_from_content_type("text/html; Charset=\"ISO-8859-1\""),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn meta_charset_is_honoured_without_header() {
        let bytes = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xe9</body></html>";
        let decoded = decode_page(bytes, None);
        assert_eq!(decoded.encoding_label, "windows-1252");
        assert!(decoded.html.contains("caf\u{e9}"));
        assert!(!decoded.lossy);
    }

    #[test]
    fn malformed_utf8_is_replaced_not_rejected() {
        let decoded = decode_page(b"ok \xff done", Some("text/html; charset=utf-8"));
        assert!(decoded.lossy);
        assert!(decoded.html.starts_with("ok "));
        assert!(decoded.html.ends_with(" done"));
    }
}
