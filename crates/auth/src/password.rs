//! Password hashing and verification using Argon2.
//!
//! Parameters are fixed. The cost is the point: do not lower it to make
//! requests faster.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::{AuthError, CredentialHash};

/// Argon2id memory cost in KiB (19 MiB).
pub const MEMORY_COST_KIB: u32 = 19 * 1024;
/// Argon2id iteration count.
pub const TIME_COST: u32 = 2;
/// Argon2id lanes.
pub const PARALLELISM: u32 = 1;

/// Number of leading characters of the full name used by the default secret.
pub const DEFAULT_SECRET_NAME_CHARS: usize = 2;

fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| AuthError::Hashing(format!("invalid argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Default secret for principals registered without one.
///
/// The first two characters (Unicode scalar values) of the trimmed full name,
/// followed by the trimmed document number. `("Juan Pérez", "12345678")`
/// yields `"Ju12345678"`. The result is only ever hashed, never stored.
pub fn derive_default_secret(full_name: &str, document_number: &str) -> String {
    let prefix: String = full_name
        .trim()
        .chars()
        .take(DEFAULT_SECRET_NAME_CHARS)
        .collect();
    format!("{prefix}{}", document_number.trim())
}

/// Hash a secret with a fresh random salt.
pub fn hash_secret(secret: &str) -> Result<CredentialHash, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(format!("failed to hash secret: {e}")))?;

    Ok(CredentialHash::from_phc(hash.to_string()))
}

/// Constant-time comparison of a candidate secret against a stored hash.
///
/// `Ok(false)` means mismatch; `Err` means the stored hash is unusable.
pub fn verify_secret(candidate: &str, stored: &CredentialHash) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored.as_phc())
        .map_err(|e| AuthError::Hashing(format!("failed to parse stored hash: {e}")))?;

    match hasher()?.verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(format!("verification failed: {e}"))),
    }
}

/// [`hash_secret`] on the blocking pool.
pub async fn hash_secret_blocking(secret: String) -> Result<CredentialHash, AuthError> {
    tokio::task::spawn_blocking(move || hash_secret(&secret))
        .await
        .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
}

/// [`verify_secret`] on the blocking pool.
pub async fn verify_secret_blocking(
    candidate: String,
    stored: CredentialHash,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_secret(&candidate, &stored))
        .await
        .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))?
}
