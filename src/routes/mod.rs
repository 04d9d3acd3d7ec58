//! HTTP route handlers.

pub mod auth;
pub mod post;

use crate::auth::middleware::{AppState, OptionalIdentity};
use crate::error::AppError;
use axum::{extract::Query, response::IntoResponse, routing::get, Json, Router};
use serde::Deserialize;

/// Validate that a string is a well-formed nanoid document id.
pub fn validate_id(id: &str, label: &str, expected_len: usize) -> Result<(), AppError> {
    if id.len() != expected_len
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(format!("Invalid {} format", label)));
    }
    Ok(())
}

/// Query markers the auth flow attaches to root redirects.
#[derive(Debug, Deserialize)]
pub struct RootQuery {
    pub registered: Option<String>,
    pub login: Option<String>,
}

/// GET / — landing route.
///
/// The HTML front end is served elsewhere; this echoes the redirect markers
/// and the current identity so the auth flow has a concrete target.
pub async fn index(
    OptionalIdentity(user): OptionalIdentity,
    Query(query): Query<RootQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(serde_json::json!({
        "registered": query.registered.is_some(),
        "login_required": query.login.as_deref() == Some("required"),
        "user": user.map(|u| u.display_name),
    })))
}

/// Build the application router with all endpoints.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        // Auth endpoints
        .route("/register", axum::routing::post(auth::register))
        .route("/login", axum::routing::post(auth::login))
        .route("/logout", axum::routing::post(auth::logout))
        // Board endpoints (all behind the identity gate)
        .route("/post", axum::routing::post(post::create_post))
        .route("/list", get(post::list_posts))
        .route("/detail/{id}", get(post::post_detail))
        .route("/post/{id}/edit", get(post::edit_post))
        .route(
            "/post/{id}",
            axum::routing::put(post::update_post).delete(post::delete_post),
        )
}
