//! Argon2id password hashing and the admin credential check.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::config::AdminConfig;

/// Hash a plaintext password with Argon2id and a random salt, in PHC format.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a PHC-formatted hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check a login attempt against the configured admin account.
///
/// The password is verified even when the username is wrong so both
/// failures take the same time.
pub fn verify_admin(
    admin: &AdminConfig,
    username: &str,
    password: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let password_ok = verify_password(password, &admin.password_hash)?;
    Ok(password_ok && username == admin.username)
}
