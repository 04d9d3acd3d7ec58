//! Session records.
//!
//! Redis key patterns:
//! - `session:{token}` — session record (JSON)
//!
//! Records are written with a TTL so the store reaps expired sessions on its
//! own; the record also carries an explicit expiry timestamp that the
//! session layer checks lazily on resolve. Session JSON is wrapped in
//! `zeroize::Zeroizing` after retrieval.

use crate::models::StoredSession;
use redis::AsyncCommands;
use zeroize::Zeroizing;

/// Store a session with a TTL.
pub async fn store_session<C>(
    con: &mut C,
    session: &StoredSession,
    ttl_secs: u64,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("session:{}", session.token);

    let json = serde_json::to_string(session).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON serialize",
            e.to_string(),
        ))
    })?;

    con.set_ex::<_, _, ()>(&key, json, ttl_secs).await?;

    Ok(())
}

/// Get a session by token.
///
/// The session JSON is zeroized after deserialization.
pub async fn get_session<C>(
    con: &mut C,
    token: &str,
) -> Result<Option<StoredSession>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("session:{}", token);
    let json: Option<String> = con.get(&key).await?;

    match json {
        Some(data) => {
            let zeroizing_data = Zeroizing::new(data);
            let session = serde_json::from_str(&zeroizing_data).map_err(|e| {
                redis::RedisError::from((
                    redis::ErrorKind::TypeError,
                    "JSON deserialize",
                    e.to_string(),
                ))
            })?;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

/// Delete a session.
///
/// Returns true if a record was deleted, false if it didn't exist.
pub async fn delete_session<C>(con: &mut C, token: &str) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("session:{}", token);
    let deleted: i32 = con.del(&key).await?;
    Ok(deleted > 0)
}
