use std::collections::BTreeSet;

/// Authorities are stored with this prefix; role checks add it when missing.
pub const ROLE_PREFIX: &str = "ROLE_";

/// A user as seen by the authentication pipeline: a name and its authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    roles: BTreeSet<String>,
}

impl Identity {
    pub fn new<I, R>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Roles as the plain, sorted list embedded in tokens.
    pub fn role_list(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }

    /// `has_role("ADMIN")` and `has_role("ROLE_ADMIN")` both match `ROLE_ADMIN`.
    pub fn has_role(&self, role: &str) -> bool {
        if role.starts_with(ROLE_PREFIX) {
            self.roles.contains(role)
        } else {
            self.roles.contains(&format!("{ROLE_PREFIX}{role}"))
        }
    }
}
