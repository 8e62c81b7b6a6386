use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{Error, Result};

/// Try each encoding in order with strict decoding; the first one that
/// decodes the whole buffer without malformed sequences wins.
pub fn decode_with_fallback(
    source_name: &str,
    bytes: &[u8],
    encodings: &[&'static Encoding],
) -> Result<String> {
    for &encoding in encodings {
        let body = if encoding == UTF_8 {
            bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
        } else {
            bytes
        };

        match encoding.decode_without_bom_handling_and_without_replacement(body) {
            Some(text) => {
                debug!(source = source_name, encoding = encoding.name(), "decoded");
                return Ok(text.into_owned());
            }
            None => {
                debug!(
                    source = source_name,
                    encoding = encoding.name(),
                    "decode failed, trying next"
                );
            }
        }
    }

    Err(Error::Decode {
        source_name: source_name.to_string(),
        tried: encodings.iter().map(|e| e.name().to_string()).collect(),
    })
}
