//! Admin authentication.
//!
//! - [`password`] -- Argon2id hashing and admin credential checks.
//! - [`jwt`] -- access-token generation and validation.

pub mod jwt;
pub mod password;

/// Role carried by tokens issued to the admin account.
pub const ROLE_ADMIN: &str = "admin";
