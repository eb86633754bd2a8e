//! Form payloads and storage models.

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroize;

// ============================================================================
// Form Models
// ============================================================================

/// Parameters accepted by `POST /register`.
///
/// Missing fields deserialize as empty strings and fail validation.
#[derive(Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

impl Drop for RegisterForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Parameters accepted by `POST /login`.
#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Remember the session beyond the short-lived tier.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub persist: bool,
}

impl Drop for LoginForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("persist", &self.persist)
            .finish()
    }
}

/// Interpret a boolean-like form value (`true`, `on`, `1`, `yes`).
///
/// Anything else, including an empty value, is `false`.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_flag(&raw))
}

// ============================================================================
// Storage Models
// ============================================================================

/// A user about to be inserted. The password is plaintext until the
/// credential store hashes it.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn from_form(form: &RegisterForm) -> Self {
        NewUser {
            username: form.username.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
        }
    }
}

impl Drop for NewUser {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identifier assigned to a user by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
