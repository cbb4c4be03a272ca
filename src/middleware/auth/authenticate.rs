//! Request authentication → SecurityContext in the request extensions.
//!
//! This middleware never rejects a request. Missing or bad credentials leave
//! the context anonymous and the request continues; the access middleware
//! decides whether anonymous is acceptable for the route.
//!
//! Per request:
//! 1. insert an empty `SecurityContext` (unless one is already present)
//! 2. skip credential handling for the login routes (`/api/v1/auth/`)
//! 3. read `Authorization`: `Bearer <token>` or `Basic <base64(user:pass)>`
//! 4. bearer: verify the token and read its subject, then (unless already
//!    authenticated) load the identity and re-check the token against it
//! 5. basic: (unless already authenticated) check the password against the
//!    user directory on the blocking pool, then load the identity
//! 6. populate the context and run the rest of the stack
//!
//! Failures are logged, never raised.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error, warn};

use crate::api::v1::extractors::{AuthDetails, Authentication, SecurityContext};
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::repos::user_repo::UserDirectory;
use crate::services::auth::{TokenError, TokenService};
use crate::state::AppState;

/// Token issuance lives here; a client cannot present a token before it has one.
pub const EXEMPT_PREFIX: &str = "/api/v1/auth/";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const BASIC_PREFIX: &str = "Basic ";

/// Credentials presented in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Basic { username: String, password: String },
}

// Do not print secrets
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Bearer(_) => f.write_str("Bearer(..)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Run request authentication in front of every route of `router`.
///
/// Apply this after (outside) `access::apply` so it runs first.
pub fn apply<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, authenticate_middleware))
}

async fn authenticate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<SecurityContext>().is_none() {
        req.extensions_mut().insert(SecurityContext::anonymous());
    }

    if is_exempt(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(credentials) = credentials(req.headers()) else {
        return next.run(req).await;
    };

    let already_authenticated = req
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    let details = audit_details(&req);

    let authentication = match credentials {
        Credentials::Bearer(token) => resolve_authentication(
            &state.tokens,
            state.users.as_ref(),
            &token,
            already_authenticated,
            details,
        ),
        Credentials::Basic { .. } if already_authenticated => {
            debug!("security context already populated");
            None
        }
        Credentials::Basic { username, password } => {
            resolve_basic(state.users.clone(), username, password, details).await
        }
    };

    if let Some(authentication) = authentication
        && let Some(ctx) = req.extensions_mut().get_mut::<SecurityContext>()
    {
        ctx.authenticate(authentication);
    }

    next.run(req).await
}

pub fn is_exempt(path: &str) -> bool {
    path.starts_with(EXEMPT_PREFIX)
}

/// The raw token from `Authorization: Bearer <token>`. The scheme is case-sensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `user:password` from `Authorization: Basic <base64>`. The scheme is case-sensitive.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BASIC_PREFIX))?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

pub fn credentials(headers: &HeaderMap) -> Option<Credentials> {
    if let Some(token) = bearer_token(headers) {
        return Some(Credentials::Bearer(token.to_string()));
    }
    basic_credentials(headers).map(|(username, password)| Credentials::Basic { username, password })
}

fn audit_details(req: &Request<Body>) -> AuthDetails {
    AuthDetails {
        remote_addr: req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
        request_id: req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    }
}

/// Turn a presented token into a principal, or `None` if it must stay anonymous.
///
/// Every failure is logged here and swallowed.
pub fn resolve_authentication(
    tokens: &TokenService,
    users: &dyn UserDirectory,
    token: &str,
    already_authenticated: bool,
    details: AuthDetails,
) -> Option<Authentication> {
    let username = match tokens.extract_username(token) {
        Ok(username) => username,
        Err(TokenError::Expired) => {
            warn!("JWT token has expired");
            return None;
        }
        Err(TokenError::Malformed(reason)) => {
            warn!(reason = %reason, "malformed JWT token");
            return None;
        }
        Err(TokenError::SignatureInvalid) => {
            warn!("invalid JWT signature");
            return None;
        }
        Err(err @ TokenError::Crypto(_)) => {
            error!(error = %err, "JWT authentication error");
            return None;
        }
    };

    if already_authenticated {
        debug!(username = %username, "security context already populated");
        return None;
    }

    let identity = match users.load_identity(&username) {
        Ok(identity) => identity,
        Err(err) => {
            warn!(username = %username, error = %err, "token subject could not be resolved");
            return None;
        }
    };

    if !tokens.validate(token, identity.username()) {
        warn!(username = %username, "invalid JWT token for user");
        return None;
    }

    debug!(
        username = %username,
        remote_addr = ?details.remote_addr,
        "user authenticated via JWT"
    );

    Some(Authentication::new(identity, details))
}

/// Check a username/password pair and turn it into a principal, or `None`.
///
/// bcrypt is CPU bound, so the check runs on the blocking pool.
pub async fn resolve_basic(
    users: Arc<dyn UserDirectory>,
    username: String,
    password: String,
    details: AuthDetails,
) -> Option<Authentication> {
    let verified = {
        let users = users.clone();
        let username = username.clone();
        tokio::task::spawn_blocking(move || users.verify_credentials(&username, &password)).await
    };

    match verified {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(username = %username, error = %err, "basic authentication failed");
            return None;
        }
        Err(err) => {
            error!(error = %err, "credential check task failed");
            return None;
        }
    }

    let identity = match users.load_identity(&username) {
        Ok(identity) => identity,
        Err(err) => {
            warn!(username = %username, error = %err, "basic user could not be resolved");
            return None;
        }
    };

    debug!(
        username = %username,
        remote_addr = ?details.remote_addr,
        "user authenticated via basic credentials"
    );

    Some(Authentication::new(identity, details))
}
