//! Session lifecycle: opaque tokens, creation, per-request resolution, teardown.
//!
//! A session is active until its TTL elapses or it is destroyed by logout.
//! Expiry is time-triggered but detected lazily on the next resolve; a
//! destroyed session never comes back.

use crate::error::AppError;
use crate::models::{epoch_secs, PublicUser, SessionClaim, StoredSession};
use crate::storage;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use redis::AsyncCommands;

/// Generate a cryptographically random session token.
///
/// Returns a base64-encoded string (44 characters) from 32 random bytes.
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Establish a session for an authenticated user.
///
/// Stores the minimal claim with issue/expiry timestamps and returns the
/// opaque token for cookie transport.
pub async fn create_session<C>(
    con: &mut C,
    user: &PublicUser,
    ttl_secs: u64,
) -> Result<String, AppError>
where
    C: AsyncCommands,
{
    let token = generate_session_token();
    let issued_at = epoch_secs();

    let session = StoredSession {
        token: token.clone(),
        claim: SessionClaim {
            user_id: user.id.clone(),
            identifier: user.identifier.clone(),
        },
        issued_at,
        expires_at: issued_at + ttl_secs,
    };

    storage::session::store_session(con, &session, ttl_secs).await?;

    Ok(token)
}

/// Resolve a session token into a request identity.
///
/// Absent or expired sessions resolve to no identity. A session whose claim
/// references a user that no longer exists is deleted on sight and resolves
/// to no identity as well. On success the user is returned with the secret
/// hash stripped. Every request re-resolves from the store; nothing is
/// cached in process.
pub async fn resolve_session<C>(con: &mut C, token: &str) -> Result<Option<PublicUser>, AppError>
where
    C: AsyncCommands,
{
    let Some(session) = storage::session::get_session(con, token).await? else {
        return Ok(None);
    };

    // The store reaps expired records on its own; the explicit check catches
    // a record it has not reaped yet.
    if session.expires_at <= epoch_secs() {
        storage::session::delete_session(con, token).await?;
        return Ok(None);
    }

    match storage::user::find_by_id(con, &session.claim.user_id).await? {
        Some(user) => Ok(Some(user.into_public())),
        None => {
            // Stale claim: the referenced user is gone. Clean up rather
            // than letting the dangling session resolve forever.
            tracing::warn!(
                action = "stale_session_invalidated",
                user_id = %session.claim.user_id,
                "Session referenced a missing user"
            );
            storage::session::delete_session(con, token).await?;
            Ok(None)
        }
    }
}

/// Destroy a session.
///
/// Idempotent: destroying an absent or already-expired session is not an
/// error.
pub async fn destroy_session<C>(con: &mut C, token: &str) -> Result<(), AppError>
where
    C: AsyncCommands,
{
    storage::session::delete_session(con, token).await?;
    Ok(())
}
