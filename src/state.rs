/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to clone: every field is an Arc over read-only data
 */
use std::sync::Arc;

use crate::middleware::auth::access::AccessPolicy;
use crate::repos::user_repo::UserDirectory;
use crate::services::auth::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserDirectory>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserDirectory>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            tokens,
            users,
            policy,
        }
    }
}
