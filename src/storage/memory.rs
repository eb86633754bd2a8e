//! Deterministic in-memory stores for tests.
//!
//! Both types behave like the real backends (unique usernames and emails,
//! expiring tokens) and additionally recognise a few sentinel usernames that
//! force each error branch without a live database:
//!
//! | username          | operation        | result              |
//! |-------------------|------------------|---------------------|
//! | `duplicateName`   | `create_user`    | `DuplicateUsername` |
//! | `duplicateEmail`  | `create_user`    | `DuplicateEmail`    |
//! | `createUser500`   | `create_user`    | `Internal`          |
//! | `createSess500`   | `create_session` | `Internal`          |

use super::{CredentialError, CredentialStore, SessionCache, SessionError};
use crate::auth::session::generate_session_token;
use crate::models::{NewUser, UserId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DUPLICATE_NAME_USER: &str = "duplicateName";
pub const DUPLICATE_EMAIL_USER: &str = "duplicateEmail";
pub const CREATE_USER_FAILURE: &str = "createUser500";
pub const CREATE_SESSION_FAILURE: &str = "createSess500";

struct MemoryUser {
    id: u64,
    email: String,
    password: String,
}

#[derive(Default)]
struct Users {
    next_id: u64,
    by_name: HashMap<String, MemoryUser>,
}

/// In-memory [`CredentialStore`].
///
/// Passwords are kept in plaintext; this type never leaves test builds.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Users>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user directly, bypassing sentinels and uniqueness checks.
    pub fn seed(&self, username: &str, email: &str, password: &str) {
        let mut users = self.users.lock();
        users.next_id += 1;
        let id = users.next_id;
        users.by_name.insert(
            username.to_string(),
            MemoryUser {
                id,
                email: email.to_string(),
                password: password.to_string(),
            },
        );
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.lock().by_name.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.users.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, user: &NewUser) -> Result<UserId, CredentialError> {
        match user.username.as_str() {
            DUPLICATE_NAME_USER => {
                return Err(CredentialError::DuplicateUsername(user.username.clone()))
            }
            DUPLICATE_EMAIL_USER => return Err(CredentialError::DuplicateEmail(user.email.clone())),
            CREATE_USER_FAILURE => {
                return Err(CredentialError::Internal(
                    "forced create_user failure".to_string(),
                ))
            }
            _ => {}
        }

        // Check and insert under one lock, like a unique constraint would.
        let mut users = self.users.lock();
        if users.by_name.contains_key(&user.username) {
            return Err(CredentialError::DuplicateUsername(user.username.clone()));
        }
        if users.by_name.values().any(|u| u.email == user.email) {
            return Err(CredentialError::DuplicateEmail(user.email.clone()));
        }

        users.next_id += 1;
        let id = users.next_id;
        users.by_name.insert(
            user.username.clone(),
            MemoryUser {
                id,
                email: user.email.clone(),
                password: user.password.clone(),
            },
        );
        Ok(UserId(id.to_string()))
    }

    async fn verify_login(&self, password: &str, username: &str) -> Result<(), CredentialError> {
        let users = self.users.lock();
        let user = users
            .by_name
            .get(username)
            .ok_or(CredentialError::UserNotFound)?;
        tracing::trace!(user_id = user.id, "Checking in-memory credentials");
        if user.password == password {
            Ok(())
        } else {
            Err(CredentialError::WrongPassword)
        }
    }
}

struct MemorySession {
    username: String,
    expires_at: Instant,
}

/// In-memory [`SessionCache`].
///
/// Lapsed entries are kept until touched so `verify_session` can report
/// [`SessionError::Expired`] separately from [`SessionError::NotFound`].
#[derive(Default)]
pub struct MemorySessionCache {
    sessions: Mutex<HashMap<String, MemorySession>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under a caller-chosen token.
    pub fn insert(&self, token: &str, username: &str, ttl: Duration) {
        self.sessions.lock().insert(
            token.to_string(),
            MemorySession {
                username: username.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.lock().contains_key(token)
    }

    /// Remaining lifetime of a live session.
    pub fn ttl(&self, token: &str) -> Option<Duration> {
        self.sessions
            .lock()
            .get(token)
            .and_then(|s| s.expires_at.checked_duration_since(Instant::now()))
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn create_session(&self, username: &str, ttl: Duration) -> Result<String, SessionError> {
        if username == CREATE_SESSION_FAILURE {
            return Err(SessionError::Internal(
                "forced create_session failure".to_string(),
            ));
        }
        let token = generate_session_token();
        self.insert(&token, username, ttl);
        Ok(token)
    }

    async fn verify_session(&self, token: &str) -> Result<String, SessionError> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get(token).ok_or(SessionError::NotFound)?;
        if session.expires_at <= Instant::now() {
            sessions.remove(token);
            return Err(SessionError::Expired);
        }
        Ok(session.username.clone())
    }

    async fn destroy_session(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.lock().remove(token);
        Ok(())
    }
}
