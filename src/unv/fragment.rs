//! Document persistence in a URL fragment.
//!
//! The whole document travels in the fragment, percent-encoded, so a shared link
//! reproduces exactly what the sender was editing.

use std::string::FromUtf8Error;
use thiserror::Error;

/// Document shown when there is nothing to restore.
pub const STARTER_DOCUMENT: &str = "import print from 'standard'\n\nif 'Unv is awesome!'\n    print('Hello World!')\n# keep editing for live results\n";

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("fragment is not valid UTF-8 once decoded")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Percent-encode `document` for use as a fragment (without the leading `#`).
pub fn encode(document: &str) -> String {
    urlencoding::encode(document).into_owned()
}

/// Reverse [`encode`]. A leading `#` is ignored.
pub fn decode(fragment: &str) -> Result<String, FragmentError> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    Ok(urlencoding::decode(fragment)?.into_owned())
}

/// The document stored in `fragment`, or [`STARTER_DOCUMENT`] when it is missing, empty
/// or cannot be decoded.
pub fn restore_or_default(fragment: Option<&str>) -> String {
    let Some(fragment) = fragment.map(|f| f.strip_prefix('#').unwrap_or(f)) else {
        return STARTER_DOCUMENT.to_string();
    };
    if fragment.is_empty() {
        return STARTER_DOCUMENT.to_string();
    }
    match decode(fragment) {
        Ok(document) => document,
        Err(error) => {
            tracing::warn!(%error, "ignoring undecodable fragment");
            STARTER_DOCUMENT.to_string()
        }
    }
}

/// `base` with the encoded document as its fragment. Any fragment already on `base` is
/// replaced.
pub fn share_url(base: &str, document: &str) -> String {
    let base = base.split_once('#').map_or(base, |(head, _)| head);
    format!("{}#{}", base, encode(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_fragment_safe() {
        let encoded = encode("if a\n    print('#1 & 100%')");
        assert!(!encoded.contains(['#', '\n', ' ', '&', '\'']));
        assert_eq!(decode(&encoded).expect("decodes"), "if a\n    print('#1 & 100%')");
    }

    #[test]
    fn test_decode_ignores_hash() {
        assert_eq!(decode("#print%28x%29").expect("decodes"), "print(x)");
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(decode("%FF%FE").is_err());
    }

    #[test]
    fn test_restore_falls_back_to_starter() {
        assert_eq!(restore_or_default(None), STARTER_DOCUMENT);
        assert_eq!(restore_or_default(Some("")), STARTER_DOCUMENT);
        assert_eq!(restore_or_default(Some("#")), STARTER_DOCUMENT);
        assert_eq!(restore_or_default(Some("%FF")), STARTER_DOCUMENT);
        assert_eq!(restore_or_default(Some("#x%20%3D%201")), "x = 1");
    }

    #[test]
    fn test_share_url_replaces_fragment() {
        assert_eq!(share_url("https://unv.dev/#old", "a b"), "https://unv.dev/#a%20b");
    }
}
