/*
 * Responsibility
 * - AppError: every failure a handler or middleware can turn into a response
 * - IntoResponse renders the ApiResponse error envelope with the HTTP status
 * - Why a token failed never reaches the client; it is only logged
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::response::ApiResponse;
use crate::middleware::auth::access::AccessDenied;
use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: full authentication is required to access this resource")]
    Unauthorized,

    #[error("Unauthorized: bad credentials")]
    BadCredentials,

    #[error("Forbidden: access is denied")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthorized => AppError::Unauthorized,
            AccessDenied::Forbidden => AppError::Forbidden,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            // Login must not reveal whether the user exists
            RepoError::UnknownIdentity(_) | RepoError::BadCredentials => AppError::BadCredentials,
            RepoError::Hash(e) => {
                tracing::error!(error = %e, "password verification failed");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().starts_with("Unauthorized"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_forbidden_envelope() {
        let (status, body) = render(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().starts_with("Forbidden"));
    }

    #[test]
    fn test_access_denied_kinds_stay_distinct() {
        assert!(matches!(
            AppError::from(AccessDenied::Unauthorized),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AccessDenied::Forbidden),
            AppError::Forbidden
        ));
    }

    #[test]
    fn test_unknown_user_looks_like_bad_password() {
        let unknown = AppError::from(RepoError::UnknownIdentity("mallory".into()));
        let wrong = AppError::from(RepoError::BadCredentials);
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    }
}
