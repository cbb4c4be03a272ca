/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証/認可は app.rs で Router 全体に layer として適用する (AccessPolicy)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{admin::stats, auth::login, health::health, users::me};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/public/health", get(health))
        .route("/admin/stats", get(stats))
        .route("/users/me", get(me))
}
