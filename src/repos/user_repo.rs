/*
 * Responsibility
 * - Look up identities by username
 * - Check username/password pairs against bcrypt hashes
 * - In-memory store seeded at startup; no persistence
 */
use std::collections::HashMap;

use crate::repos::error::RepoError;
use crate::services::auth::Identity;

/// Source of identities for the authentication pipeline.
///
/// Calls are synchronous and are not retried; callers treat any error as
/// "not authenticated".
pub trait UserDirectory: Send + Sync {
    fn load_identity(&self, username: &str) -> Result<Identity, RepoError>;

    /// Unknown users and wrong passwords are both `BadCredentials`.
    fn verify_credentials(&self, username: &str, password: &str) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
struct UserRow {
    identity: Identity,
    password_hash: String,
}

#[derive(Debug)]
pub struct InMemoryUserRepo {
    users: HashMap<String, UserRow>,
    bcrypt_cost: u32,
    // Verified against for unknown usernames so they cost the same as a wrong password
    dummy_hash: String,
}

impl InMemoryUserRepo {
    pub fn new(bcrypt_cost: u32) -> Result<Self, RepoError> {
        Ok(Self {
            users: HashMap::new(),
            bcrypt_cost,
            dummy_hash: bcrypt::hash("unknown-user-placeholder", bcrypt_cost)?,
        })
    }

    /// Seed the demo accounts: `user` (ROLE_USER) and `admin` (ROLE_ADMIN).
    /// Each password is `<username>_pass`.
    pub fn with_demo_users(bcrypt_cost: u32) -> Result<Self, RepoError> {
        let mut repo = Self::new(bcrypt_cost)?;
        repo.insert("user", "user_pass", ["ROLE_USER"])?;
        repo.insert("admin", "admin_pass", ["ROLE_ADMIN"])?;
        Ok(repo)
    }

    pub fn insert<I, R>(&mut self, username: &str, password: &str, roles: I) -> Result<(), RepoError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;
        self.users.insert(
            username.to_string(),
            UserRow {
                identity: Identity::new(username, roles),
                password_hash,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryUserRepo {
    fn load_identity(&self, username: &str) -> Result<Identity, RepoError> {
        self.users
            .get(username)
            .map(|row| row.identity.clone())
            .ok_or_else(|| RepoError::UnknownIdentity(username.to_string()))
    }

    fn verify_credentials(&self, username: &str, password: &str) -> Result<(), RepoError> {
        let Some(row) = self.users.get(username) else {
            // Same bcrypt work as a known user, then reject regardless.
            bcrypt::verify(password, &self.dummy_hash)?;
            return Err(RepoError::BadCredentials);
        };

        if bcrypt::verify(password, &row.password_hash)? {
            Ok(())
        } else {
            Err(RepoError::BadCredentials)
        }
    }
}
