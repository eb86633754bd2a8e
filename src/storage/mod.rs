//! Storage layer: durable user records and ephemeral session tokens.
//!
//! Handlers never talk to Postgres or Redis directly. They go through the
//! [`CredentialStore`] and [`SessionCache`] traits so the in-memory doubles
//! in [`memory`] can stand in for both backends.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod session;
pub mod user;

use crate::models::{NewUser, UserId};
use async_trait::async_trait;
use std::time::Duration;

/// Failures from the credential store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} is taken")]
    DuplicateUsername(String),

    #[error("{0} is already in use")]
    DuplicateEmail(String),

    #[error("Username is incorrect.")]
    UserNotFound,

    #[error("Incorrect Password.")]
    WrongPassword,

    #[error("Credential store error: {0}")]
    Internal(String),
}

/// Failures from the session cache.
///
/// `NotFound` and `Expired` both mean "unauthenticated" to every caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session expired")]
    Expired,

    #[error("Session cache error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::Internal(format!("Redis error: {}", err))
    }
}

impl From<sqlx::Error> for CredentialError {
    fn from(err: sqlx::Error) -> Self {
        CredentialError::Internal(format!("Database error: {}", err))
    }
}

/// Durable user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Username and email uniqueness is enforced atomically
    /// by the store, not by a prior lookup.
    async fn create_user(&self, user: &NewUser) -> Result<UserId, CredentialError>;

    /// Check `password` against the stored digest for `username`.
    async fn verify_login(&self, password: &str, username: &str) -> Result<(), CredentialError>;
}

/// Ephemeral token -> username mapping.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Mint a fresh token for `username` that lives for `ttl`.
    async fn create_session(&self, username: &str, ttl: Duration) -> Result<String, SessionError>;

    async fn verify_session(&self, token: &str) -> Result<String, SessionError>;

    /// Remove `token`. Removing an unknown token succeeds.
    async fn destroy_session(&self, token: &str) -> Result<(), SessionError>;
}
