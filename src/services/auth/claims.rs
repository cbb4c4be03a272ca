//! Claim set carried by access tokens, and typed accessors over it.
//!
//! Every field is optional on the wire so a token missing a claim still
//! decodes; the accessor for that claim reports it as malformed.
//!
//! `iat` and `exp` are NumericDate values with millisecond precision:
//! whole seconds are written as integers, anything finer as a fraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::auth::error::TokenError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roles: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric_date"
    )]
    iat: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric_date"
    )]
    exp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
}

impl TokenClaims {
    /// Timestamps keep millisecond precision; anything finer is dropped.
    pub fn new(
        subject: impl Into<String>,
        roles: Vec<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            sub: Some(subject.into()),
            roles: Some(roles),
            iat: Some(to_numeric_date(issued_at)),
            exp: Some(to_numeric_date(expires_at)),
            iss: Some(issuer.into()),
        }
    }

    pub fn subject(&self) -> Result<&str, TokenError> {
        non_empty(self.sub.as_deref(), "sub")
    }

    pub fn issuer(&self) -> Result<&str, TokenError> {
        non_empty(self.iss.as_deref(), "iss")
    }

    pub fn issued_at(&self) -> Result<DateTime<Utc>, TokenError> {
        numeric_date(self.iat, "iat")
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        numeric_date(self.exp, "exp")
    }

    pub fn roles(&self) -> Result<&[String], TokenError> {
        self.roles
            .as_deref()
            .ok_or_else(|| TokenError::missing_claim("roles"))
    }
}

fn non_empty<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, TokenError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TokenError::missing_claim(name)),
    }
}

fn to_numeric_date(value: DateTime<Utc>) -> f64 {
    value.timestamp_millis() as f64 / 1000.0
}

fn numeric_date(value: Option<f64>, name: &'static str) -> Result<DateTime<Utc>, TokenError> {
    let secs = value.ok_or_else(|| TokenError::missing_claim(name))?;
    let out_of_range = || TokenError::Malformed(format!("'{name}' claim is out of range"));
    if !secs.is_finite() {
        return Err(out_of_range());
    }
    // `as` saturates; chrono rejects the saturated values.
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64).ok_or_else(out_of_range)
}

fn serialize_numeric_date<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(secs) if secs.fract() == 0.0 && secs.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(*secs as i64))
        }
        Some(secs) => serializer.serialize_some(secs),
        None => serializer.serialize_none(),
    }
}
