//! Access decision: path prefix rules evaluated against the security context.
//!
//! Runs after the authentication middleware. Rules are ordered by prefix
//! length (most specific first) and the first match decides. A path no rule
//! matches requires an authenticated principal.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::SecurityContext;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    /// Role name without the `ROLE_` prefix, e.g. `ADMIN`.
    Role(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub prefix: String,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn new(prefix: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            requirement,
        }
    }

    /// Segment-aware: `/api/v1/admin` matches `/api/v1/admin/stats` but not
    /// `/api/v1/administrators`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthorized,
    #[error("insufficient role")]
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(mut rules: Vec<AccessRule>) -> Self {
        // Stable: equal-length prefixes keep their declared order.
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { rules }
    }

    /// Login and public routes are open, admin routes need `ADMIN`,
    /// everything else needs a principal.
    pub fn default_rules() -> Self {
        Self::new(vec![
            AccessRule::new("/api/v1/auth", Requirement::PermitAll),
            AccessRule::new("/api/v1/public", Requirement::PermitAll),
            AccessRule::new("/api/v1/admin", Requirement::Role("ADMIN".to_string())),
        ])
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn matching_rule(&self, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn decide(&self, path: &str, ctx: &SecurityContext) -> Result<(), AccessDenied> {
        // No matching rule means Authenticated.
        match self.matching_rule(path).map(|rule| &rule.requirement) {
            Some(Requirement::PermitAll) => Ok(()),
            _ if !ctx.is_authenticated() => Err(AccessDenied::Unauthorized),
            None | Some(Requirement::Authenticated) => Ok(()),
            Some(Requirement::Role(role)) if ctx.has_role(role) => Ok(()),
            Some(Requirement::Role(_)) => Err(AccessDenied::Forbidden),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Enforce `policy` on every route of `router`.
///
/// Must be applied before (inside) the authentication middleware so the
/// context is already populated when this runs.
pub fn apply<S>(router: Router<S>, policy: Arc<AccessPolicy>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(policy, access_middleware))
}

async fn access_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decision = match req.extensions().get::<SecurityContext>() {
        Some(ctx) => policy.decide(req.uri().path(), ctx),
        None => policy.decide(req.uri().path(), &SecurityContext::anonymous()),
    };

    if let Err(denied) = decision {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            reason = %denied,
            "access denied"
        );
        return Err(denied.into());
    }

    Ok(next.run(req).await)
}
