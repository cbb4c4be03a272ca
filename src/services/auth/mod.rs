pub mod claims;
pub mod codec;
pub mod error;
pub mod factory;
pub mod identity;
pub mod signing_key;
pub mod token_service;

pub use claims::TokenClaims;
pub use error::TokenError;
pub use factory::build_token_service;
pub use identity::Identity;
pub use signing_key::{KeyError, SigningKey, derive_key};
pub use token_service::{IssuedToken, TokenService};
