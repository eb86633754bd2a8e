//! Argon2id password hashing.
//!
//! Digests are stored as PHC strings, so the salt and parameters travel with
//! the hash. Verification goes through `PasswordVerifier`, which compares in
//! constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::LazyLock;

/// Digest checked when the username does not exist, so an unknown user
/// costs the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("panurge-timing-equalizer").ok());

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC digest.
///
/// A malformed digest never verifies.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Stored password digest is malformed");
            false
        }
    }
}

/// Burn one verification against the dummy digest.
pub fn verify_dummy(password: &str) {
    if let Some(digest) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, digest);
    }
}
