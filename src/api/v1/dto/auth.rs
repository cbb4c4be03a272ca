use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::response::timestamp_format;
use crate::services::auth::IssuedToken;

pub const TOKEN_TYPE: &str = "Bearer";

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationRequest {
    pub username: String,
    pub password: String,
}

impl AuthenticationRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.trim().is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    #[serde(with = "timestamp_format")]
    pub issued_at: DateTime<Utc>,
    #[serde(with = "timestamp_format")]
    pub expires_at: DateTime<Utc>,
    pub issuer: String,
    pub username: String,
}

impl AuthenticationResponse {
    pub fn new(issued: IssuedToken, issuer: &str, username: &str) -> Self {
        Self {
            access_token: issued.token,
            token_type: TOKEN_TYPE,
            issued_at: issued.issued_at,
            expires_at: issued.expires_at,
            issuer: issuer.to_string(),
            username: username.to_string(),
        }
    }
}
