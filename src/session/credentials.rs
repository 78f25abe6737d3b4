//! Password hashing and verification (Argon2id, PHC string format).
//!
//! Hashing is CPU bound, so both helpers run on the blocking pool.

use anyhow::{Context, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash a plaintext password into a PHC string.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task panics.
pub async fn hash_password(plain: &str) -> Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| anyhow::anyhow!("failed to hash password"))
    })
    .await
    .context("password hashing task failed")?
}

/// Check a plaintext password against a stored PHC string.
///
/// Mismatches, malformed hashes and task failures all return `false`.
pub async fn verify_password(plain: &str, hashed: &str) -> bool {
    let plain = plain.to_owned();
    let hashed = hashed.to_owned();
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hashed).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
    })
    .await
    .unwrap_or(false)
}
