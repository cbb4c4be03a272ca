/*!
 * Security context extractor
 *
 * Responsibility:
 * - Give handlers the authenticated principal (CurrentUser)
 * - axum-specific code lives in core, plain types in types
 */

mod core;
mod types;

pub use core::CurrentUser;
pub use types::{AuthDetails, Authentication, SecurityContext};
