/*
 * Responsibility
 * - GET /users/me の response DTO
 * - SecurityContext の内容 (principal, roles, audit details) をそのまま返す
 */
use serde::Serialize;

use crate::api::v1::extractors::Authentication;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    /// Sorted authority strings, e.g. `["ROLE_USER"]`
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&Authentication> for MeResponse {
    fn from(auth: &Authentication) -> Self {
        Self {
            username: auth.username().to_string(),
            roles: auth.identity.role_list(),
            remote_addr: auth.details.remote_addr.map(|addr| addr.to_string()),
            request_id: auth.details.request_id.clone(),
        }
    }
}
