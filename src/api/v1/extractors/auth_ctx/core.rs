use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::{Authentication, SecurityContext};

/// Handler-side access to the authenticated principal.
///
/// Expects the authentication middleware to have stored a `SecurityContext`
/// in the request extensions. Anonymous requests are rejected with 401.
pub struct CurrentUser(pub Authentication);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::authentication)
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
