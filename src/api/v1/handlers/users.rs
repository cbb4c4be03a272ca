/*
 * Responsibility
 * - GET /users/me: the caller as seen by the security context
 */
use axum::Json;

use crate::api::response::ApiResponse;
use crate::api::v1::dto::users::MeResponse;
use crate::api::v1::extractors::CurrentUser;

pub async fn me(CurrentUser(auth): CurrentUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::success(MeResponse::from(&auth)))
}
