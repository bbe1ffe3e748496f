//! Response body decoding.

use encoding_rs::Encoding;

use crate::error_handling::FetchError;

/// Looks up a text encoding by its WHATWG label (`"utf-8"`, `"gbk"`, `"latin1"`, ...).
///
/// # Errors
///
/// Returns `FetchError::UnknownEncoding` when no encoding matches.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, FetchError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| FetchError::UnknownEncoding(label.to_string()))
}

/// Decodes a body with `encoding` and trims surrounding whitespace.
///
/// A byte order mark overrides `encoding`. Malformed sequences become U+FFFD
/// rather than failing the fetch.
pub(crate) fn decode_trimmed(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!(
            "Response body contained malformed {} sequences; replaced with U+FFFD",
            actual.name()
        );
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_8, WINDOWS_1252};

    #[test]
    fn test_decode_trims_whitespace() {
        assert_eq!(decode_trimmed(b"  hello  ", UTF_8), "hello");
        assert_eq!(decode_trimmed(b"\r\n\tok\n", UTF_8), "ok");
    }

    #[test]
    fn test_decode_whitespace_only_is_empty() {
        assert_eq!(decode_trimmed(b"", UTF_8), "");
        assert_eq!(decode_trimmed(b"   \n\t ", UTF_8), "");
    }

    #[test]
    fn test_decode_with_selected_encoding() {
        // "中文" in GBK
        let bytes = [0xD6, 0xD0, 0xCE, 0xC4];
        assert_eq!(decode_trimmed(&bytes, GBK), "中文");
        // "café" in windows-1252
        assert_eq!(decode_trimmed(b"caf\xE9", WINDOWS_1252), "café");
    }

    #[test]
    fn test_decode_bom_overrides_selected_encoding() {
        let bytes = b"\xEF\xBB\xBFcaf\xC3\xA9";
        assert_eq!(decode_trimmed(bytes, WINDOWS_1252), "café");
    }

    #[test]
    fn test_decode_malformed_utf8_is_replaced() {
        assert_eq!(decode_trimmed(b"ok\xFF", UTF_8), "ok\u{FFFD}");
    }

    #[test]
    fn test_encoding_for_label() {
        assert_eq!(encoding_for_label("utf-8").expect("known"), UTF_8);
        assert_eq!(encoding_for_label(" GBK ").expect("known"), GBK);
        assert!(matches!(
            encoding_for_label("not-an-encoding"),
            Err(FetchError::UnknownEncoding(label)) if label == "not-an-encoding"
        ));
    }
}
