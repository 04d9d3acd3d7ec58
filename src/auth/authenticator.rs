//! Credential verification against the user store.

use crate::auth::hasher::{self, DUMMY_HASH};
use crate::error::AppError;
use crate::models::PublicUser;
use crate::storage;
use redis::AsyncCommands;

/// Why an authentication attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    UnknownIdentifier,
    BadSecret,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::UnknownIdentifier => "unknown_identifier",
            AuthFailure::BadSecret => "bad_secret",
        }
    }
}

/// Outcome of a credential check.
///
/// Success carries the user with the secret hash already stripped. The
/// failure reason is for logging and the component contract; the HTTP layer
/// responds with a uniform message for both reasons.
#[derive(Debug)]
pub enum AuthResult {
    Success(PublicUser),
    Failure(AuthFailure),
}

/// Check a submitted (identifier, secret) pair against the stored credentials.
///
/// An unknown identifier still pays for one hash comparison, against a fixed
/// dummy hash, so the two failure paths cost the same and lookups cannot be
/// used to enumerate registered identifiers by timing.
pub async fn authenticate<C>(
    con: &mut C,
    identifier: &str,
    secret: &str,
) -> Result<AuthResult, AppError>
where
    C: AsyncCommands,
{
    let user = storage::user::find_by_identifier(con, identifier).await?;

    let Some(user) = user else {
        // Burn a comparison; the result is meaningless and discarded.
        let _ = hasher::verify_secret(secret, DUMMY_HASH).await?;
        return Ok(AuthResult::Failure(AuthFailure::UnknownIdentifier));
    };

    if !hasher::verify_secret(secret, &user.secret_hash).await? {
        return Ok(AuthResult::Failure(AuthFailure::BadSecret));
    }

    Ok(AuthResult::Success(user.into_public()))
}
