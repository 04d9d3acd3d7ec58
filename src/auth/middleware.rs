//! Axum extractors for the per-request identity.
//!
//! The identity context is built fresh for every request from the session
//! cookie and dropped when the request ends. Handlers that take [`Identity`]
//! are behind the gate: no resolved identity, no handler.

use crate::auth::session::resolve_session;
use crate::config::Config;
use crate::error::AppError;
use crate::models::PublicUser;
use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
}

/// Pull the session cookie value out of a Cookie header, if present.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Rejection for gated routes.
///
/// An unauthenticated caller is bounced to the root with a query marker, the
/// way a logged-out browser session lands back on the front page. A store
/// failure is a 500, not a login bounce.
pub enum IdentityRejection {
    Unauthenticated,
    Store(AppError),
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            IdentityRejection::Unauthenticated => {
                Redirect::to("/?login=required").into_response()
            }
            IdentityRejection::Store(err) => err.into_response(),
        }
    }
}

/// Resolved request identity.
///
/// Reads the session cookie, resolves the session record, and loads the
/// referenced user with the secret hash stripped. Rejects when the cookie is
/// missing or the session is absent, expired, or destroyed.
pub struct Identity(pub PublicUser);

impl FromRequestParts<AppState> for Identity {
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            session_cookie_value(&parts.headers).ok_or(IdentityRejection::Unauthenticated)?;

        let mut con = state
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                IdentityRejection::Store(AppError::Internal(format!(
                    "Redis connection error: {}",
                    e
                )))
            })?;

        match resolve_session(&mut con, &token).await {
            Ok(Some(user)) => Ok(Identity(user)),
            Ok(None) => Err(IdentityRejection::Unauthenticated),
            Err(e) => Err(IdentityRejection::Store(e)),
        }
    }
}

/// Optional request identity.
///
/// Resolves the same way as [`Identity`] but never bounces the request;
/// handlers see None instead. Store failures still surface as errors.
pub struct OptionalIdentity(pub Option<PublicUser>);

impl FromRequestParts<AppState> for OptionalIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_cookie_value(&parts.headers) else {
            return Ok(OptionalIdentity(None));
        };

        let mut con = state
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))?;

        Ok(OptionalIdentity(resolve_session(&mut con, &token).await?))
    }
}
