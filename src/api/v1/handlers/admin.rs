/*
 * Responsibility
 * - GET /admin/stats (ROLE_ADMIN のみ; 判定は access middleware)
 */
use axum::Json;
use serde::Serialize;

use crate::api::response::ApiResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active_users: u64,
    pub total_requests: u64,
    pub cpu_usage: f64,
}

// Static figures; there is no metrics backend behind this endpoint.
pub async fn stats() -> Json<ApiResponse<Stats>> {
    Json(ApiResponse::success(Stats {
        active_users: 100,
        total_requests: 1000,
        cpu_usage: 45.5,
    }))
}
