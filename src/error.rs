//! Error types and Axum response conversions.
//!
//! Only failures that leave the request without a page to render live here.
//! Validation, duplicate and bad-credential outcomes are rendered inline by
//! the route handlers with a 200.

use crate::storage::{CredentialError, SessionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

pub const LOGIN_PATH: &str = "/login";
pub const PROTECTED_PATH: &str = "/game";

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    /// No live session on a route that needs one.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Live session on a route reserved for anonymous visitors.
    #[error("Already authenticated")]
    AlreadyAuthenticated,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(msg) => {
                // Log detailed error server-side; the client only sees the status
                tracing::error!(error = %msg, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            AppError::NotAuthenticated => Redirect::to(LOGIN_PATH).into_response(),
            AppError::AlreadyAuthenticated => Redirect::to(PROTECTED_PATH).into_response(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound | SessionError::Expired => AppError::NotAuthenticated,
            SessionError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Internal(err.to_string())
    }
}
