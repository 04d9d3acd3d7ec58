//! Auth endpoints: register, login, logout.

use crate::auth::authenticator::{self, AuthResult};
use crate::auth::hasher;
use crate::auth::middleware::{session_cookie_value, AppState, SESSION_COOKIE};
use crate::auth::session::{create_session, destroy_session};
use crate::error::AppError;
use crate::models::{epoch_secs, LoginRequest, RegisterRequest, StoredUser};
use crate::storage;
use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect},
};

/// Validate registration input. The confirmation secret is checked here and
/// then dropped; only the primary secret is ever hashed.
fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let identifier = req.identifier.trim();
    if identifier.len() < 3 || identifier.len() > 254 || !identifier.contains('@') {
        return Err(AppError::BadRequest(
            "Identifier must be an email-like handle (3-254 characters)".to_string(),
        ));
    }

    let display_name = req.display_name.trim();
    if display_name.is_empty() || display_name.len() > 64 {
        return Err(AppError::BadRequest(
            "Display name must be 1-64 characters".to_string(),
        ));
    }

    if req.secret.len() < 8 || req.secret.len() > 128 {
        return Err(AppError::BadRequest(
            "Secret must be 8-128 characters".to_string(),
        ));
    }

    if req.secret_confirm != req.secret {
        return Err(AppError::BadRequest(
            "Secret confirmation does not match".to_string(),
        ));
    }

    Ok(())
}

/// POST /register — Create a user record.
pub async fn register(
    State(state): State<AppState>,
    Form(req): Form<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_registration(&req)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    let secret_hash = hasher::hash_secret(&req.secret, state.config.bcrypt_cost).await?;

    let user = StoredUser {
        id: nanoid::nanoid!(12),
        identifier: req.identifier.trim().to_string(),
        display_name: req.display_name.trim().to_string(),
        secret_hash,
        created_at: epoch_secs(),
    };

    let inserted = storage::user::insert_user(&mut con, &user).await?;
    if !inserted {
        return Err(AppError::Conflict(
            "Identifier already registered".to_string(),
        ));
    }

    tracing::info!(action = "user_registered", user_id = %user.id, "New user registered");

    Ok(Redirect::to("/?registered=1"))
}

/// POST /login — Verify credentials and establish a session.
///
/// The specific failure reason is logged; the response body stays uniform
/// so callers cannot tell an unknown identifier from a bad secret.
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.identifier.is_empty() || req.secret.is_empty() {
        return Err(AppError::BadRequest(
            "Identifier and secret are required".to_string(),
        ));
    }

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

    match authenticator::authenticate(&mut con, &req.identifier, &req.secret).await? {
        AuthResult::Failure(reason) => {
            tracing::warn!(action = "auth_failed", reason = reason.as_str(), "Login rejected");
            Err(AppError::Unauthorized(
                "Invalid identifier or secret".to_string(),
            ))
        }
        AuthResult::Success(user) => {
            let token = create_session(&mut con, &user, state.config.session_ttl_secs).await?;

            tracing::info!(action = "auth_success", user_id = %user.id, "User authenticated");

            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE, token, state.config.session_ttl_secs
            );
            Ok(([(SET_COOKIE, cookie)], Redirect::to("/list")))
        }
    }
}

/// POST /logout — Destroy the current session.
///
/// Idempotent: a missing or already-expired session still clears the cookie
/// and redirects to the root.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = session_cookie_value(&headers) {
        let mut con = state
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

        destroy_session(&mut con, &token).await?;

        tracing::info!(action = "logout", "Session destroyed");
    }

    let clear = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    Ok(([(SET_COOKIE, clear)], Redirect::to("/")))
}
