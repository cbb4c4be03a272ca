/*
 * Responsibility
 * - POST /auth/login: username/password → signed access token
 * - bcrypt verification is CPU bound, so it runs on the blocking pool
 */
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::api::response::ApiResponse;
use crate::api::v1::dto::auth::{AuthenticationRequest, AuthenticationResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthenticationResponse>>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let AuthenticationRequest { username, password } = req;

    let users = state.users.clone();
    let name = username.clone();
    tokio::task::spawn_blocking(move || users.verify_credentials(&name, &password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "credential check task failed");
            AppError::Internal
        })?
        .inspect_err(|_| tracing::warn!(username = %username, "login failed"))?;

    let identity = state.users.load_identity(&username)?;
    let issued = state.tokens.issue(&identity).map_err(|e| {
        tracing::error!(error = %e, "token issuance failed");
        AppError::Internal
    })?;

    tracing::info!(username = %identity.username(), "login succeeded");

    Ok(Json(ApiResponse::success(AuthenticationResponse::new(
        issued,
        state.tokens.issuer(),
        identity.username(),
    ))))
}
