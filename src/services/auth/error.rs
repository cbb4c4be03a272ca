use thiserror::Error;

/// Failures produced while decoding or verifying a bearer token.
///
/// Display strings go to logs only. Clients never see which kind occurred.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token processing failed: {0}")]
    Crypto(String),
}

impl TokenError {
    pub(crate) fn missing_claim(name: &'static str) -> Self {
        Self::Malformed(format!("missing or empty '{name}' claim"))
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::MissingRequiredClaim(_) => Self::Malformed(e.to_string()),
            _ => Self::Crypto(e.to_string()),
        }
    }
}
