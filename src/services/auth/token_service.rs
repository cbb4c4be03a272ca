use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;

use crate::services::auth::claims::TokenClaims;
use crate::services::auth::codec::TokenCodec;
use crate::services::auth::error::TokenError;
use crate::services::auth::identity::Identity;
use crate::services::auth::signing_key::SigningKey;

/// A freshly signed token plus the timestamps embedded in it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates access tokens.
///
/// Two entry points check a presented token:
/// - `validate` answers yes/no and never fails (request path)
/// - `verify_and_extract` returns claims or the specific failure (diagnostics)
#[derive(Clone, Debug)]
pub struct TokenService {
    codec: TokenCodec,
    issuer: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(key: &SigningKey, issuer: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            codec: TokenCodec::new(key),
            issuer: issuer.into(),
            lifetime,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token with the configured lifetime and issuer.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue_with(identity, self.lifetime, &self.issuer)
    }

    pub fn issue_with(
        &self,
        identity: &Identity,
        lifetime: Duration,
        issuer: &str,
    ) -> Result<IssuedToken, TokenError> {
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|_| TokenError::Crypto("token lifetime out of range".to_string()))?;

        // Claims carry milliseconds; truncate first so exp - iat == lifetime.
        let now = Utc::now().trunc_subsecs(3);
        let claims = TokenClaims::new(
            identity.username(),
            identity.role_list(),
            now,
            now + lifetime,
            issuer,
        );

        let token = self.codec.encode(&claims)?;

        debug!(
            username = %identity.username(),
            roles = ?identity.roles(),
            "issued access token"
        );

        Ok(IssuedToken {
            token,
            issued_at: claims.issued_at()?,
            expires_at: claims.expires_at()?,
        })
    }

    /// True iff the token is authentic, names `expected_username`, and has not expired.
    ///
    /// Subject comparison is byte-exact.
    pub fn validate(&self, token: &str, expected_username: &str) -> bool {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "token failed validation");
                return false;
            }
        };

        let subject_matches = claims
            .subject()
            .is_ok_and(|subject| subject == expected_username);
        let not_expired = claims
            .expires_at()
            .is_ok_and(|expires_at| expires_at > Utc::now());

        subject_matches && not_expired
    }

    /// Decode, verify and check expiry, reporting which check failed.
    pub fn verify_and_extract(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = self.codec.decode(token).inspect_err(|err| {
            debug!(error = %err, "token verification failed");
        })?;

        let expires_at = claims.expires_at()?;
        if expires_at <= Utc::now() {
            debug!(expired_at = %expires_at, "token verification failed: expired");
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.verify_and_extract(token)?;
        Ok(claims.subject()?.to_string())
    }

    pub fn extract_roles(&self, token: &str) -> Result<Vec<String>, TokenError> {
        let claims = self.verify_and_extract(token)?;
        Ok(claims.roles()?.to_vec())
    }
}
