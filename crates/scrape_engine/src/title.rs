use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Selector};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}")]
    DecodeFailure { encoding: String },
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> chardetng fallback.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    let encoding = sniff_encoding(bytes, content_type);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

/// Like [`decode_html`], but malformed sequences become U+FFFD instead of
/// failing. A body cut at a byte cap may end inside a character.
pub fn decode_html_lossy(bytes: &[u8], content_type: Option<&str>) -> String {
    let (text, _, _) = sniff_encoding(bytes, content_type).decode(bytes);
    text.into_owned()
}

fn sniff_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(enc) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return enc;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Text of the first non-empty `<title>`, whitespace collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let doc = Html::parse_document(html);
    doc.select(&selector)
        .map(|node| {
            node.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find(|title| !title.is_empty())
}

/// True for media types that can carry a `<title>`.
pub(crate) fn is_html(content_type: &str) -> bool {
    let media = content_type.split(';').next().unwrap_or(content_type).trim();
    media.eq_ignore_ascii_case("text/html") || media.eq_ignore_ascii_case("application/xhtml+xml")
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(['"', '\'']).to_string())
        })
        .next()
}
