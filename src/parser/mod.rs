pub mod dom;
pub mod error;
pub mod extract;
pub mod query;

use std::borrow::Cow;

use encoding_rs::Encoding;
use scraper::Html;
use tracing::debug;

use error::ParseError;
use extract::{Extractor, PageReport};

/// Decode raw page bytes with a WHATWG encoding label ("windows-1251", "utf-8", ...).
/// Invalid sequences are replaced rather than rejected.
pub fn decode<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>, ParseError> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ParseError::UnknownEncoding {
            label: label.to_string(),
        }
    })?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "Replaced malformed byte sequences");
    }
    Ok(text)
}

/// Page pipeline: bytes → text → markup tree → message records.
pub fn process_page(
    bytes: &[u8],
    encoding: &str,
    extractor: &Extractor,
) -> Result<PageReport, ParseError> {
    let text = decode(bytes, encoding)?;
    let document = dom::from_html(&Html::parse_document(&text));
    Ok(extractor.extract_page(&document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::ExtractConfig;

    #[test]
    fn decodes_windows_1251() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("5 мар 2020");
        assert_eq!(decode(&bytes, "windows-1251").unwrap(), "5 мар 2020");
        assert_eq!(decode(&bytes, "cp1251").unwrap(), "5 мар 2020");
    }

    #[test]
    fn unknown_label_rejected() {
        let err = decode(b"abc", "klingon").unwrap_err();
        assert!(matches!(err, ParseError::UnknownEncoding { label } if label == "klingon"));
    }

    #[test]
    fn deeply_nested_page_on_worker_sized_stack() {
        let depth = 200_000;
        let html = format!(
            "<html><body><div class=\"message\">{}deep{}</div></body></html>",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        // rayon workers run with a 2 MiB stack by default
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let extractor = Extractor::new(ExtractConfig::default());
                let report = process_page(html.as_bytes(), "utf-8", &extractor).unwrap();
                report.records.into_iter().map(|r| r.text).collect::<Vec<_>>()
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), vec!["deep".to_string()]);
    }

    #[test]
    fn process_encoded_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/dialog.html").unwrap();
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(&html);
        let extractor = Extractor::new(ExtractConfig::default());
        let report = process_page(&bytes, "windows-1251", &extractor).unwrap();
        assert_eq!(report.records.len(), 4);
        assert!(report.failures.is_empty());
        assert_eq!(report.records[0].author, "Иван Петров");
    }
}
