use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use anyhow::Context;
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;
use tracing::error;

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_async(plain: String) -> anyhow::Result<String> {
    spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task")?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(plain: String, stored_hash: String) -> anyhow::Result<bool> {
    spawn_blocking(move || verify_password(&plain, &stored_hash))
        .await
        .context("password verification task")?
}

/// Hash a plaintext password into an argon2 PHC string with a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("verify password: {e}")),
    }
}
