//! Post documents.
//!
//! Redis key patterns:
//! - `post:{nanoid}` — post document (JSON)
//! - `posts:index` — ZSET of post ids scored by insertion sequence
//! - `post:seq` — monotonically increasing insertion counter
//!
//! The index score is the insertion sequence rather than a timestamp so the
//! newest-first listing keeps a total order even when two posts land within
//! the same second.

use crate::models::StoredPost;
use redis::AsyncCommands;

/// Insert a post and add it to the listing index.
pub async fn insert_post<C>(con: &mut C, post: &StoredPost) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("post:{}", post.id);
    let json = serde_json::to_string(post).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON serialize",
            e.to_string(),
        ))
    })?;

    con.set::<_, _, ()>(&key, json).await?;

    let seq: u64 = con.incr("post:seq", 1).await?;
    con.zadd::<_, _, _, ()>("posts:index", &post.id, seq).await?;

    Ok(())
}

/// Get a post by ID.
pub async fn get_post<C>(con: &mut C, id: &str) -> Result<Option<StoredPost>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("post:{}", id);
    let json: Option<String> = con.get(&key).await?;

    match json {
        Some(data) => {
            let post = serde_json::from_str(&data).map_err(|e| {
                redis::RedisError::from((
                    redis::ErrorKind::TypeError,
                    "JSON deserialize",
                    e.to_string(),
                ))
            })?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

/// Update a post's title and content.
///
/// Author fields and creation time are immutable; they are carried over from
/// the stored document. Returns false if the post does not exist.
pub async fn update_post<C>(
    con: &mut C,
    id: &str,
    title: &str,
    content: &str,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let Some(mut post) = get_post(con, id).await? else {
        return Ok(false);
    };

    post.title = title.to_string();
    post.content = content.to_string();

    let key = format!("post:{}", id);
    let json = serde_json::to_string(&post).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON serialize",
            e.to_string(),
        ))
    })?;

    con.set::<_, _, ()>(&key, json).await?;

    Ok(true)
}

/// Delete a post and its index entry.
///
/// Returns true if the post was deleted, false if it didn't exist.
pub async fn delete_post<C>(con: &mut C, id: &str) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("post:{}", id);
    let deleted: i32 = con.del(&key).await?;

    con.zrem::<_, _, ()>("posts:index", id).await?;

    Ok(deleted > 0)
}

/// List posts newest-first.
///
/// Reads the index in reverse insertion order and skips ids whose document
/// has gone missing.
pub async fn list_posts<C>(con: &mut C) -> Result<Vec<StoredPost>, redis::RedisError>
where
    C: AsyncCommands,
{
    let ids: Vec<String> = con.zrevrange("posts:index", 0, -1).await?;

    let mut posts = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(post) = get_post(con, &id).await? {
            posts.push(post);
        }
    }

    Ok(posts)
}
