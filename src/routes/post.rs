//! Board endpoints. Every route here requires a resolved identity.

use crate::auth::middleware::{AppState, Identity};
use crate::error::AppError;
use crate::models::{epoch_secs, CreatePostRequest, StoredPost, UpdatePostRequest};
use crate::storage;
use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect},
    Json,
};

const POST_ID_LEN: usize = 12;

fn validate_post_input(title: &str, content: &str) -> Result<(), AppError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Title and content are required".to_string(),
        ));
    }
    if title.len() > 200 {
        return Err(AppError::BadRequest(
            "Title must be at most 200 characters".to_string(),
        ));
    }
    if content.len() > 20_000 {
        return Err(AppError::BadRequest(
            "Content must be at most 20000 characters".to_string(),
        ));
    }
    Ok(())
}

/// POST /post — Create a post stamped with the author's identity.
pub async fn create_post(
    Identity(user): Identity,
    State(state): State<AppState>,
    Form(req): Form<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_post_input(&req.title, &req.content)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let post = StoredPost {
        id: nanoid::nanoid!(12),
        title: req.title,
        content: req.content,
        author_id: user.id,
        author_name: user.display_name,
        created_at: epoch_secs(),
    };

    storage::post::insert_post(&mut con, &post).await?;

    tracing::info!(
        action = "post_created",
        post_id = %post.id,
        author_id = %post.author_id,
        "Post created"
    );

    Ok(Redirect::to("/list"))
}

/// GET /list — Posts newest-first.
///
/// Returns the render model for the list view: the current identity plus
/// every post in reverse-chronological order.
pub async fn list_posts(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let posts = storage::post::list_posts(&mut con).await?;

    Ok(Json(serde_json::json!({
        "user": user,
        "posts": posts,
    })))
}

/// GET /detail/{id} — Single post.
pub async fn post_detail(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    super::validate_id(&id, "post id", POST_ID_LEN)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let post = storage::post::get_post(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "user": user,
        "post": post,
    })))
}

/// GET /post/{id}/edit — Render model for the edit form.
pub async fn edit_post(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    super::validate_id(&id, "post id", POST_ID_LEN)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let post = storage::post::get_post(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "user": user,
        "post": post,
    })))
}

/// PUT /post/{id} — Update title and content.
///
/// Author fields and creation time never change, whoever edits.
pub async fn update_post(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(req): Form<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    super::validate_id(&id, "post id", POST_ID_LEN)?;
    validate_post_input(&req.title, &req.content)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let updated = storage::post::update_post(&mut con, &id, &req.title, &req.content).await?;
    if !updated {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!(action = "post_updated", post_id = %id, user_id = %user.id, "Post updated");

    Ok(Redirect::to(&format!("/detail/{}", id)))
}

/// DELETE /post/{id} — Delete a post.
///
/// Any authenticated user may delete any post; authorship is recorded but
/// not enforced here.
pub async fn delete_post(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    super::validate_id(&id, "post id", POST_ID_LEN)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let deleted = storage::post::delete_post(&mut con, &id).await?;
    if !deleted {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!(action = "post_deleted", post_id = %id, user_id = %user.id, "Post deleted");

    Ok(Redirect::to("/list"))
}
