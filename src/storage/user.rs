//! Postgres credential store.
//!
//! Table `users`:
//! - `username`: UNIQUE (`users_username_key`)
//! - `email`: UNIQUE (`users_email_key`)
//! - `password_hash`: argon2id PHC string
//!
//! Duplicate detection relies entirely on the two unique constraints, so two
//! concurrent registrations for the same name cannot both succeed.

use super::{CredentialError, CredentialStore};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::models::{NewUser, UserId};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use zeroize::Zeroizing;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )
";

/// [`CredentialStore`] backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        PgCredentialStore { pool }
    }

    /// Open a pool against `database_url` and verify it with a round trip.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(PgCredentialStore { pool })
    }

    /// Create the `users` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Remove every user. Only for test databases.
    pub async fn delete_all_users(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Map a failed insert onto the duplicate it reports, if any.
fn map_insert_error(err: sqlx::Error, user: &NewUser) -> CredentialError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => {
                    return CredentialError::DuplicateUsername(user.username.clone())
                }
                Some(EMAIL_CONSTRAINT) => {
                    return CredentialError::DuplicateEmail(user.email.clone())
                }
                _ => {}
            }
        }
    }
    CredentialError::from(err)
}

/// Run an argon2 job on the blocking pool.
async fn blocking<T, F>(job: F) -> Result<T, CredentialError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| CredentialError::Internal(format!("Password task failed: {}", e)))
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, user: &NewUser) -> Result<UserId, CredentialError> {
        let password = Zeroizing::new(user.password.clone());
        let digest = blocking(move || hash_password(&password))
            .await?
            .map_err(|e| CredentialError::Internal(format!("Password hashing failed: {}", e)))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, user))?;

        Ok(UserId(id.to_string()))
    }

    async fn verify_login(&self, password: &str, username: &str) -> Result<(), CredentialError> {
        let digest: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let password = Zeroizing::new(password.to_string());
        match digest {
            Some(digest) => {
                let valid = blocking(move || verify_password(&password, &digest)).await?;
                if valid {
                    Ok(())
                } else {
                    Err(CredentialError::WrongPassword)
                }
            }
            None => {
                blocking(move || verify_dummy(&password)).await?;
                Err(CredentialError::UserNotFound)
            }
        }
    }
}
