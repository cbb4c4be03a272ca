//! HMAC signing key derived from the configured secret.
//!
//! The secret is first read as standard base64; if that fails the raw UTF-8
//! bytes are used. Either way the result must be long enough for HS256.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;

/// HS256 needs at least 256 bits of key material.
pub const MIN_KEY_BYTES: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing secret is empty")]
    Empty,
    #[error("signing key is {len} bytes, HS256 requires at least {MIN_KEY_BYTES}")]
    TooShort { len: usize },
}

/// Where the key bytes came from. Logged once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Base64,
    Utf8,
}

#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
    source: KeySource,
}

// Do not print key material
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .field("source", &self.source)
            .finish()
    }
}

impl SigningKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.bytes)
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.bytes)
    }
}

/// Derive the signing key for `secret`.
///
/// Pure and deterministic: the same secret always yields the same bytes.
pub fn derive_key(secret: &str) -> Result<SigningKey, KeyError> {
    if secret.is_empty() {
        return Err(KeyError::Empty);
    }

    let (bytes, source) = match STANDARD.decode(secret) {
        Ok(decoded) => (decoded, KeySource::Base64),
        Err(_) => (secret.as_bytes().to_vec(), KeySource::Utf8),
    };

    if bytes.len() < MIN_KEY_BYTES {
        return Err(KeyError::TooShort { len: bytes.len() });
    }

    Ok(SigningKey { bytes, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 48 bytes once decoded
    const B64_SECRET: &str = "c2VjcmV0LWtleS1mb3ItdGVzdHMtdGhhdC1pcy1sb25nLWVub3VnaC0xMjM0NTY3";

    #[test]
    fn test_derive_key_is_deterministic() {
        let a = derive_key(B64_SECRET).unwrap();
        let b = derive_key(B64_SECRET).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_base64_secret_is_decoded() {
        let key = derive_key(B64_SECRET).unwrap();
        assert_eq!(key.source(), KeySource::Base64);
        assert_eq!(key.as_bytes(), STANDARD.decode(B64_SECRET).unwrap().as_slice());
    }

    #[test]
    fn test_non_base64_secret_uses_utf8_bytes() {
        // '-' is outside the standard alphabet
        let secret = "this-secret-is-not-base64-but-is-long-enough!";
        let key = derive_key(secret).unwrap();
        assert_eq!(key.source(), KeySource::Utf8);
        assert_eq!(key.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn test_hex_secret_falls_back_to_utf8() {
        // Odd length: not valid padded base64
        let secret =
            "9FE731B56C152D78B780CE60C2E28AF73FD8BE454E98F87A5B6CE72C9DD84F9C42B8C9D1F0123456789ABCDEF0123456789ABCDEF";
        let key = derive_key(secret).unwrap();
        assert_eq!(key.source(), KeySource::Utf8);
        assert_eq!(key.as_bytes().len(), secret.len());
    }

    #[test]
    fn test_non_ascii_secret_uses_utf8_bytes() {
        let secret = "סוד-ארוך-מספיק-עבור-חתימה-בטוחה";
        let key = derive_key(secret).unwrap();
        assert_eq!(key.source(), KeySource::Utf8);
        assert_eq!(key.as_bytes(), secret.as_bytes());
        // Length is measured in bytes, not characters.
        assert_eq!(derive_key("סוד-קצר-מאוד").unwrap_err(), KeyError::TooShort { len: 22 });
    }

    #[test]
    fn test_short_secret_is_rejected() {
        assert_eq!(
            derive_key("too-short").unwrap_err(),
            KeyError::TooShort { len: 9 }
        );
    }

    #[test]
    fn test_short_base64_secret_is_rejected() {
        // "short" -> 5 bytes
        assert_eq!(
            derive_key("c2hvcnQ=").unwrap_err(),
            KeyError::TooShort { len: 5 }
        );
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(derive_key("").unwrap_err(), KeyError::Empty);
    }

    #[test]
    fn test_debug_does_not_print_key_bytes() {
        let key = derive_key("this-secret-is-not-base64-but-is-long-enough!").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("this-secret"));
        assert!(debug.contains("len"));
    }
}
