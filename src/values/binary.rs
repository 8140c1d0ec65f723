//! Binary (hex / base64) lexical checks
//!
//! Length facets on the binary types count decoded bytes, so the lexical
//! check only has to decode far enough to find the byte length.

use crate::error::{ValueError, ValueErrorKind};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

static HEX_BINARY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{2})*$").unwrap());

/// Which binary text encoding a type uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryEncoding {
    /// Two hex digits per byte
    Hex,
    /// RFC 2045 base64
    Base64,
}

impl BinaryEncoding {
    /// Canonical facet value
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryEncoding::Hex => "hex",
            BinaryEncoding::Base64 => "base64",
        }
    }

    /// Parse the `encoding` facet value
    pub fn from_lexical(s: &str) -> Option<Self> {
        match s {
            "hex" => Some(BinaryEncoding::Hex),
            "base64" => Some(BinaryEncoding::Base64),
            _ => None,
        }
    }
}

/// Check well-formedness and return the decoded byte length.
pub fn decoded_length(lexical: &str, encoding: BinaryEncoding) -> Result<usize, ValueError> {
    match encoding {
        BinaryEncoding::Hex => {
            if !HEX_BINARY_REGEX.is_match(lexical) {
                return Err(ValueError::new(
                    ValueErrorKind::InvalidLexical,
                    "value is not a valid hexadecimal encoding",
                )
                .with_value(lexical));
            }
            Ok(lexical.len() / 2)
        }
        BinaryEncoding::Base64 => {
            let cleaned = lexical.replace(' ', "");
            if cleaned.is_empty() {
                return Ok(0);
            }
            base64::engine::general_purpose::STANDARD
                .decode(&cleaned)
                .map(|bytes| bytes.len())
                .map_err(|_| {
                    ValueError::new(
                        ValueErrorKind::InvalidLexical,
                        "value is not a valid base64 encoding",
                    )
                    .with_value(lexical)
                })
        }
    }
}
