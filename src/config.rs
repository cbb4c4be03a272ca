/*
 * Responsibility
 * - Read settings from the environment (.env via dotenvy, then process env)
 * - Validate them; anything missing or weak fails startup
 * - Derive the signing key once so the rest of the process shares it read-only
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::signing_key::{self, KeyError, SigningKey};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_EXPIRATION_MS: u64 = 3_600_000; // 1 hour
const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Key(KeyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Key(e) => write!(f, "invalid configuration: JWT_SECRET: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Key(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyError> for ConfigError {
    fn from(e: KeyError) -> Self {
        ConfigError::Key(e)
    }
}

/// Token settings. The raw secret is not kept once the key is derived.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub signing_key: SigningKey,
    pub expiration: Duration,
    pub issuer: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub jwt: JwtConfig,
    // Cost used when hashing the seeded account passwords
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let signing_key = signing_key::derive_key(&secret)?;

        let expiration_ms: u64 = match lookup("JWT_EXPIRATION_MS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("JWT_EXPIRATION_MS"))?,
            None => DEFAULT_EXPIRATION_MS,
        };
        if expiration_ms == 0 {
            return Err(ConfigError::Invalid("JWT_EXPIRATION_MS"));
        }

        let issuer = lookup("JWT_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_ISSUER"))?;

        let bcrypt_cost: u32 = match lookup("BCRYPT_COST") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("BCRYPT_COST"))?,
            None => DEFAULT_BCRYPT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        Ok(Self {
            addr,
            app_env,
            jwt: JwtConfig {
                signing_key,
                expiration: Duration::from_millis(expiration_ms),
                issuer,
            },
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "config-test-secret-that-is-long-enough-for-hs256";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_loads_jwt_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_MS", "7200000"),
            ("JWT_ISSUER", "new-issuer"),
        ]))
        .unwrap();

        assert_eq!(config.jwt.issuer, "new-issuer");
        assert_eq!(config.jwt.expiration, Duration::from_millis(7_200_000));
        assert_eq!(config.jwt.signing_key.as_bytes(), SECRET.as_bytes());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_ISSUER", "svc"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.jwt.expiration, Duration::from_secs(3600));
        assert_eq!(config.bcrypt_cost, 12);
    }

    #[test]
    fn test_production_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_ISSUER", "svc"),
            ("APP_ENV", "PROD"),
        ]))
        .unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn test_missing_secret() {
        let err = Config::from_lookup(lookup_from(&[("JWT_ISSUER", "svc")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_missing_issuer() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_ISSUER")));
    }

    #[test]
    fn test_weak_secret_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "new-secret"),
            ("JWT_ISSUER", "svc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Key(KeyError::TooShort { len: 10 })));
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_numbers() {
        for (key, value) in [
            ("PORT", "http"),
            ("JWT_EXPIRATION_MS", "soon"),
            ("JWT_EXPIRATION_MS", "0"),
            ("BCRYPT_COST", "2"),
        ] {
            let err = Config::from_lookup(lookup_from(&[
                ("JWT_SECRET", SECRET),
                ("JWT_ISSUER", "svc"),
                (key, value),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(k) if k == key), "{key}={value}");
        }
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("JWT_ISSUER", "svc"),
        ]))
        .unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
