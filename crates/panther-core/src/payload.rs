//! Base64 transcoding for opaque byte payloads.
//!
//! The backend serialises `[]byte` fields (command output, credential
//! passwords) as standard padded base64. Decoding is lossy only for output
//! that is not valid UTF-8, which is rendered with replacement characters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Errors from payload transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload was not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Encode text as standard base64.
pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode standard base64 into raw bytes.
pub fn decode_bytes(encoded: &str) -> Result<Vec<u8>, PayloadError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| PayloadError::InvalidBase64(e.to_string()))
}

/// Decode standard base64 into text.
pub fn decode(encoded: &str) -> Result<String, PayloadError> {
    let bytes = decode_bytes(encoded)?;
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}
