//! Base64 handling for subscription bodies.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use thiserror::Error;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Why a candidate string could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("input is empty")]
    Empty,

    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Cheap guess at whether `content` is a Base64 blob.
///
/// The length is counted in characters, whitespace included, and must be
/// a multiple of 4. Plain text that happens to fit both rules is misclassified; the
/// caller falls back to the raw text when decoding then fails.
pub fn looks_like_base64(content: &str) -> bool {
    content.chars().count() % 4 == 0 && content.chars().all(is_base64_char)
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=') || c.is_whitespace()
}

/// Decode a Base64 string into UTF-8 text.
///
/// Whitespace is stripped and missing padding restored before decoding.
/// The standard alphabet is tried first, then the URL-safe one.
pub fn decode_base64(encoded: &str) -> Result<String, DecodeError> {
    let mut compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }

    let missing = (4 - compact.len() % 4) % 4;
    compact.extend(std::iter::repeat('=').take(missing));

    let bytes = match STANDARD_LENIENT.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(standard_err) => URL_SAFE_LENIENT
            .decode(compact.as_bytes())
            .map_err(|_| standard_err)?,
    };

    Ok(String::from_utf8(bytes)?)
}
