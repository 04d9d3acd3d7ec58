//! Secret hashing and verification.
//!
//! bcrypt runs behind spawn_blocking: the work factor makes each call tens of
//! milliseconds of pure CPU, which must not stall the request executors.
//! Plaintext copies are wrapped in Zeroizing so they are cleared once the
//! hash or comparison is done.

use crate::error::AppError;
use zeroize::Zeroizing;

/// A fixed, well-formed bcrypt hash at the default work factor.
///
/// Used to equalize verification cost when the identifier is unknown; the
/// comparison result is always discarded.
pub const DUMMY_HASH: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hash a secret with the given bcrypt cost.
///
/// Salted per call; hashing the same secret twice yields different strings.
pub async fn hash_secret(secret: &str, cost: u32) -> Result<String, AppError> {
    let secret = Zeroizing::new(secret.to_string());
    tokio::task::spawn_blocking(move || bcrypt::hash(secret.as_bytes(), cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Hash error: {}", e)))
}

/// Verify a secret against a stored hash.
///
/// Returns false on mismatch and on a malformed stored hash; a mismatch is
/// never an error. The digest comparison inside bcrypt is constant-time.
pub async fn verify_secret(secret: &str, hashed: &str) -> Result<bool, AppError> {
    let secret = Zeroizing::new(secret.to_string());
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(secret.as_bytes(), &hashed).unwrap_or(false))
        .await
        .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))
}
