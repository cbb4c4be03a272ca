//! Request authentication and access control.
//!
//! Order on the router: `authenticate` (outer) populates the
//! `SecurityContext`, then `access` (inner) decides.

pub mod access;
pub mod authenticate;
