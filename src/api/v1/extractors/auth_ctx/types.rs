/*
 * Responsibility
 * - The per-request security context the handlers see
 * - The authentication middleware creates it empty, fills it at most once,
 *   and stores it in the request extensions; it is dropped with the request
 */

use std::net::SocketAddr;

use crate::services::auth::Identity;

/// Audit details recorded when a request authenticates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthDetails {
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
}

/// An authenticated principal: who, with which roles, from where.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub identity: Identity,
    pub details: AuthDetails,
}

impl Authentication {
    pub fn new(identity: Identity, details: AuthDetails) -> Self {
        Self { identity, details }
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }
}

/// Empty (anonymous) until the authentication middleware populates it.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.authentication.as_ref().map(|a| &a.identity)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.identity().is_some_and(|identity| identity.has_role(role))
    }

    /// Populate the context. Returns false (and keeps the existing principal)
    /// if it was already authenticated.
    pub fn authenticate(&mut self, authentication: Authentication) -> bool {
        if self.authentication.is_some() {
            return false;
        }
        self.authentication = Some(authentication);
        true
    }
}
