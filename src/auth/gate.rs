//! Axum extractors that classify a request by its session cookie.
//!
//! - [`AuthSession`]: the route needs a live session; anonymous callers are
//!   redirected to the login page.
//! - `Option<AuthSession>`: the route serves both kinds of caller.
//! - [`Guest`]: the route is for anonymous callers only; logged-in callers
//!   are redirected to the protected page.
//!
//! Missing, expired and unknown tokens are all the same "anonymous" outcome.
//! A cache failure is a 500 on routes that need to know the caller's state,
//! and anonymous on routes that serve either.

use super::cookie::SESSION_COOKIE;
use super::manager::SessionManager;
use crate::config::Config;
use crate::error::AppError;
use crate::storage::{CredentialStore, SessionCache, SessionError};
use crate::templates::Renderer;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: SessionManager,
    pub templates: Arc<dyn Renderer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionCache>,
        templates: Arc<dyn Renderer>,
        config: Arc<Config>,
    ) -> Self {
        AppState {
            manager: SessionManager::new(credentials, sessions, config.clone()),
            templates,
            config,
        }
    }
}

/// Authenticated session extractor.
///
/// Reads the `session` cookie and verifies it against the session cache.
pub struct AuthSession {
    pub username: String,
    pub token: String,
}

/// Look up the caller's session, treating every verification failure other
/// than a backend fault as "no session".
async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Option<AuthSession>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => return Ok(None),
    };

    match state.manager.authenticate(&token).await {
        Ok(username) => Ok(Some(AuthSession { username, token })),
        Err(SessionError::NotFound | SessionError::Expired) => {
            tracing::debug!(path = %parts.uri.path(), "Session cookie did not verify");
            Ok(None)
        }
        Err(SessionError::Internal(msg)) => Err(AppError::Internal(msg)),
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await?
            .ok_or(AppError::NotAuthenticated)
    }
}

/// Optional authenticated session extractor.
///
/// Yields `None` for anonymous callers instead of rejecting the request. A
/// cache failure also yields `None`: pages that serve both kinds of caller
/// still render, in their anonymous variant.
impl OptionalFromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match resolve_session(parts, state).await {
            Err(AppError::Internal(msg)) => {
                tracing::error!(error = %msg, "Session lookup failed, serving anonymous page");
                Ok(None)
            }
            other => other,
        }
    }
}

/// Anonymous-only extractor for the register and login routes.
pub struct Guest;

impl FromRequestParts<AppState> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await? {
            Some(_) => Err(AppError::AlreadyAuthenticated),
            None => Ok(Guest),
        }
    }
}
