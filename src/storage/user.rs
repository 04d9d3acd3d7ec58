//! User credential records.
//!
//! Redis key patterns:
//! - `user:{nanoid}` — user record (JSON)
//! - `identifier:{identifier}` — identifier lookup to user id (STRING)
//!
//! User records are created at registration and never updated or deleted
//! here. Record JSON is wrapped in `zeroize::Zeroizing` after retrieval
//! because it carries the secret hash.

use crate::models::StoredUser;
use redis::AsyncCommands;
use zeroize::Zeroizing;

/// Insert a new user record.
///
/// The identifier lookup key is claimed with SET NX first; if the claim
/// fails, another record already owns the identifier and nothing is written.
/// Returns false on a duplicate identifier, leaving the existing record
/// untouched.
pub async fn insert_user<C>(con: &mut C, user: &StoredUser) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let identifier_key = format!("identifier:{}", user.identifier);
    let claimed: bool = con.set_nx(&identifier_key, &user.id).await?;
    if !claimed {
        return Ok(false);
    }

    let user_key = format!("user:{}", user.id);
    let json = serde_json::to_string(user).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON serialize",
            e.to_string(),
        ))
    })?;

    con.set::<_, _, ()>(&user_key, json).await?;

    Ok(true)
}

/// Get a user by ID.
///
/// The user JSON is zeroized after deserialization.
pub async fn find_by_id<C>(con: &mut C, id: &str) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("user:{}", id);
    let json: Option<String> = con.get(&key).await?;

    match json {
        Some(data) => {
            let zeroizing_data = Zeroizing::new(data);
            let user = serde_json::from_str(&zeroizing_data).map_err(|e| {
                redis::RedisError::from((
                    redis::ErrorKind::TypeError,
                    "JSON deserialize",
                    e.to_string(),
                ))
            })?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

/// Get a user by identifier.
///
/// Performs a two-step lookup: identifier -> user_id -> user record.
pub async fn find_by_identifier<C>(
    con: &mut C,
    identifier: &str,
) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let identifier_key = format!("identifier:{}", identifier);
    let user_id: Option<String> = con.get(&identifier_key).await?;

    match user_id {
        Some(id) => find_by_id(con, &id).await,
        None => Ok(None),
    }
}
