/*
 * Responsibility
 * - GET /public/health (疎通用, 認証不要)
 */
use axum::Json;
use serde::Serialize;

use crate::api::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::success(Health {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
