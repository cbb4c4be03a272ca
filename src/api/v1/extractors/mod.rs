pub mod auth_ctx;

pub use auth_ctx::{AuthDetails, Authentication, CurrentUser, SecurityContext};
