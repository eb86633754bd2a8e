//! Session orchestration: turns register/login/logout outcomes into session
//! cache mutations and session cookies.
//!
//! The manager holds no storage of its own. Per request the state machine is
//! `Unauthenticated -> Authenticated` on a verified cookie and back on
//! logout; a cookie that fails verification counts as no cookie at all.

use super::cookie::{removal_cookie, session_cookie};
use crate::config::Config;
use crate::models::{LoginForm, NewUser, RegisterForm};
use crate::storage::{CredentialError, CredentialStore, SessionCache, SessionError};
use crate::validation::{validate_registration, validate_username, ValidationError};
use axum_extra::extract::cookie::Cookie;
use std::sync::Arc;

/// Why a registration or login did not produce a session.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Message to show inline on the form, or `None` when the failure is a
    /// backend fault that must surface as a 500.
    pub fn user_message(&self) -> Option<String> {
        match self {
            AuthError::Invalid(e) => Some(e.to_string()),
            AuthError::Credentials(CredentialError::Internal(_)) => None,
            AuthError::Credentials(e) => Some(e.to_string()),
            AuthError::Session(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionCache>,
    config: Arc<Config>,
}

impl SessionManager {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionCache>,
        config: Arc<Config>,
    ) -> Self {
        SessionManager {
            credentials,
            sessions,
            config,
        }
    }

    /// Create the user, then log them straight in with a transient session.
    pub async fn register(&self, form: &RegisterForm) -> Result<Cookie<'static>, AuthError> {
        validate_registration(&form.username, &form.password, &form.email)?;

        let user_id = self
            .credentials
            .create_user(&NewUser::from_form(form))
            .await?;
        tracing::info!(
            action = "user_registered",
            user_id = %user_id,
            username = %form.username,
            "New user registered"
        );

        self.start_session(&form.username, false).await
    }

    /// Check credentials and open a session in the tier `persist` selects.
    pub async fn login(&self, form: &LoginForm) -> Result<Cookie<'static>, AuthError> {
        // The password policy governs new passwords only; a wrong password
        // must read as "Incorrect Password." rather than a policy failure.
        validate_username(&form.username)?;

        if let Err(e) = self
            .credentials
            .verify_login(&form.password, &form.username)
            .await
        {
            if !matches!(e, CredentialError::Internal(_)) {
                tracing::warn!(
                    action = "auth_failed",
                    username = %form.username,
                    reason = %e,
                    "Login rejected"
                );
            }
            return Err(e.into());
        }

        let cookie = self.start_session(&form.username, form.persist).await?;
        tracing::info!(
            action = "auth_success",
            username = %form.username,
            persist = form.persist,
            "User logged in"
        );
        Ok(cookie)
    }

    /// Destroy the session behind `token` (if any) and return the cookie
    /// that clears it client-side.
    ///
    /// The removal cookie is issued even when the cache is unreachable; the
    /// orphaned session then lapses on its own TTL.
    pub async fn logout(&self, token: Option<&str>) -> Cookie<'static> {
        if let Some(token) = token {
            match self.sessions.destroy_session(token).await {
                Ok(()) => tracing::info!(action = "logout", "Session destroyed"),
                Err(e) => {
                    tracing::error!(action = "logout", error = %e, "Failed to destroy session")
                }
            }
        }
        removal_cookie(self.config.session_cookie_secure)
    }

    /// Resolve a cookie token to the username that owns it.
    pub async fn authenticate(&self, token: &str) -> Result<String, SessionError> {
        self.sessions.verify_session(token).await
    }

    async fn start_session(
        &self,
        username: &str,
        persist: bool,
    ) -> Result<Cookie<'static>, AuthError> {
        let ttl = self.config.session_ttl(persist);
        let token = self.sessions.create_session(username, ttl).await?;
        Ok(session_cookie(token, ttl, self.config.session_cookie_secure))
    }
}
