//! Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenService;

pub fn build_token_service(config: &Config) -> Arc<TokenService> {
    let jwt = &config.jwt;
    tracing::info!(
        issuer = %jwt.issuer,
        lifetime_ms = jwt.expiration.as_millis() as u64,
        key_source = ?jwt.signing_key.source(),
        "token service configured"
    );

    Arc::new(TokenService::new(
        &jwt.signing_key,
        jwt.issuer.clone(),
        jwt.expiration,
    ))
}
