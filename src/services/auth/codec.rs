use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::services::auth::claims::TokenClaims;
use crate::services::auth::error::TokenError;
use crate::services::auth::signing_key::SigningKey;

/// HS256 encoder/decoder bound to one signing key.
///
/// Decoding verifies shape and signature only. Expiry is left to
/// `TokenService` so that an expired but authentic token still yields claims.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

// Do not print key material
impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("alg", &self.header.alg)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(key: &SigningKey) -> Self {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        // Claim presence is checked by the accessors.
        validation.required_spec_claims.clear();

        Self {
            header,
            encoding_key: key.encoding_key(),
            decoding_key: key.decoding_key(),
            validation,
        }
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&self.header, claims, &self.encoding_key).map_err(TokenError::from)
    }

    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        match jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e)
                if matches!(e.kind(), ErrorKind::Base64(_)) && only_signature_undecodable(token) =>
            {
                Err(TokenError::SignatureInvalid)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A changed last signature character can leave non-zero padding bits, which
/// fails base64 before the HMAC is ever compared. With an intact header and
/// payload that is still a signature mismatch.
fn only_signature_undecodable(token: &str) -> bool {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return false;
    };

    URL_SAFE_NO_PAD.decode(header).is_ok()
        && URL_SAFE_NO_PAD.decode(payload).is_ok()
        && URL_SAFE_NO_PAD.decode(signature).is_err()
}

pub fn encode(claims: &TokenClaims, key: &SigningKey) -> Result<String, TokenError> {
    TokenCodec::new(key).encode(claims)
}

pub fn decode(token: &str, key: &SigningKey) -> Result<TokenClaims, TokenError> {
    TokenCodec::new(key).decode(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::signing_key::derive_key;
    use chrono::{Duration, Utc};

    const SECRET: &str = "codec-test-secret-with-plenty-of-entropy-0001";

    fn key() -> SigningKey {
        derive_key(SECRET).unwrap()
    }

    fn claims_expiring_in(lifetime: Duration) -> TokenClaims {
        let now = Utc::now();
        TokenClaims::new(
            "alice",
            vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()],
            now,
            now + lifetime,
            "svc",
        )
    }

    fn replace_char(s: &str, idx: usize) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_encode_produces_three_url_safe_segments() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert!(URL_SAFE_NO_PAD.decode(part).is_ok());
        }
    }

    #[test]
    fn test_header_is_hs256_jwt() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let header_segment = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_segment).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_decode_returns_encoded_claims() {
        let claims = claims_expiring_in(Duration::hours(1));
        let token = encode(&claims, &key()).unwrap();
        assert_eq!(decode(&token, &key()).unwrap(), claims);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let claims = claims_expiring_in(Duration::hours(1));
        let codec = TokenCodec::new(&key());
        assert_eq!(
            codec.encode(&claims).unwrap(),
            codec.encode(&claims).unwrap()
        );
    }

    #[test]
    fn test_decode_does_not_check_expiry() {
        let claims = claims_expiring_in(Duration::hours(-1));
        let token = encode(&claims, &key()).unwrap();
        let decoded = decode(&token, &key()).unwrap();
        assert!(decoded.expires_at().unwrap() < Utc::now());
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for idx in sig_start..token.len() {
            let tampered = replace_char(&token, idx);
            assert_eq!(
                decode(&tampered, &key()).unwrap_err(),
                TokenError::SignatureInvalid,
                "offset {}",
                idx - sig_start
            );
        }
    }

    #[test]
    fn test_last_signature_char_swap_is_rejected() {
        // The last character carries padding bits; many swaps make it
        // non-canonical base64. Vary the subject to cover many signatures.
        let codec = TokenCodec::new(&key());
        let now = Utc::now();
        for i in 0..200 {
            let claims = TokenClaims::new(
                format!("user-{i}"),
                vec!["ROLE_USER".to_string()],
                now,
                now + Duration::hours(1),
                "svc",
            );
            let token = codec.encode(&claims).unwrap();
            let tampered = replace_char(&token, token.len() - 1);
            assert_eq!(
                codec.decode(&tampered).unwrap_err(),
                TokenError::SignatureInvalid,
                "{token}"
            );
        }
    }

    #[test]
    fn test_undecodable_header_stays_malformed() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let tampered = format!("!{}", &token[1..]);
        assert!(matches!(
            decode(&tampered, &key()).unwrap_err(),
            TokenError::Malformed(_)
        ));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let payload_start = token.find('.').unwrap() + 1;
        let tampered = replace_char(&token, payload_start + 3);
        assert_eq!(
            decode(&tampered, &key()).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn test_other_key_is_rejected() {
        let token = encode(&claims_expiring_in(Duration::hours(1)), &key()).unwrap();
        let other = derive_key("another-secret-that-is-long-enough-to-sign!!").unwrap();
        assert_eq!(
            decode(&token, &other).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn test_not_a_jwt_is_malformed() {
        let err = decode("not.a.valid.jwt.token", &key()).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        for token in ["", "abc", "abc.def"] {
            let err = decode(token, &key()).unwrap_err();
            assert!(matches!(err, TokenError::Malformed(_)), "{token}: {err:?}");
        }
    }

    #[test]
    fn test_other_algorithm_is_malformed() {
        let header = Header::new(Algorithm::HS512);
        let token = jsonwebtoken::encode(
            &header,
            &claims_expiring_in(Duration::hours(1)),
            &key().encoding_key(),
        )
        .unwrap();
        let err = decode(&token, &key()).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn test_missing_claims_still_decode() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "iss": "svc" }),
            &key().encoding_key(),
        )
        .unwrap();
        let claims = decode(&token, &key()).unwrap();
        assert_eq!(claims.issuer().unwrap(), "svc");
        assert!(matches!(claims.subject(), Err(TokenError::Malformed(_))));
    }
}
