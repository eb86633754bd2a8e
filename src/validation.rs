//! Registration and login input checks.
//!
//! These run before any storage call; a failure never touches the
//! credential store or creates a session.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_USERNAME_LENGTH: usize = 16;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 64;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Punctuation accepted in passwords. At least one is required.
pub const PASSWORD_SYMBOLS: &str = "!?@#$%^&*()-_+=.,:;";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
        .expect("email pattern is valid")
});

/// Rendered verbatim as the inline form message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid email")]
    InvalidEmail,
}

/// 1 to 16 ASCII letters or digits.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty()
        || username.len() > MAX_USERNAME_LENGTH
        || !username.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(())
}

/// 8 to 64 characters drawn from letters, digits and [`PASSWORD_SYMBOLS`],
/// with at least one lowercase, uppercase, digit and symbol.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(ValidationError::InvalidPassword);
    }

    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);
    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_symbol(c))
    {
        return Err(ValidationError::InvalidPassword);
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(is_symbol);
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(ValidationError::InvalidPassword);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Check a registration in field order: username, password, email.
pub fn validate_registration(
    username: &str,
    password: &str,
    email: &str,
) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_password(password)?;
    validate_email(email)
}
