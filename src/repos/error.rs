/*
 * Responsibility
 * - What the user directory reports to callers
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unknown identity: {0}")]
    UnknownIdentity(String),
    #[error("bad credentials")]
    BadCredentials,
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
}
