//! URL-safe framing of the three token segments.
//!
//! base64url here means standard base64 with `+`/`/` swapped for `-`/`_`
//! and trailing `=` padding stripped on encode. Decode re-pads to the
//! next multiple of four before decoding.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{AuthError, AuthResult};

pub fn encode_segment(bytes: &[u8]) -> String {
    let mut encoded = URL_SAFE.encode(bytes);
    while encoded.ends_with('=') {
        encoded.pop();
    }
    encoded
}

pub fn decode_segment(input: &str) -> AuthResult<Vec<u8>> {
    let mut padded = input.to_owned();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|err| AuthError::Decode(err.to_string()))
}

pub fn join(header: &str, payload: &str, signature: &str) -> String {
    format!("{header}.{payload}.{signature}")
}

pub fn split(token: &str) -> AuthResult<(&str, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(AuthError::MalformedToken),
    }
}
