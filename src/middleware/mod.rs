/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: bearer authentication + access decision
 * - http / security_headers: transport-level layers applied in app.rs
 */
pub mod auth;
pub mod http;
pub mod security_headers;
