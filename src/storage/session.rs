//! Redis session cache.
//!
//! Redis key pattern:
//! - `session:{token}`: username (STRING), written with `SET EX`
//!
//! Redis evicts lapsed keys itself, so an expired token is indistinguishable
//! from one that was never issued and both surface as
//! [`SessionError::NotFound`].

use super::{SessionCache, SessionError};
use crate::auth::session::generate_session_token;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Store a session with TTL.
pub async fn store_session<C>(
    con: &mut C,
    token: &str,
    username: &str,
    ttl_secs: u64,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    con.set_ex::<_, _, ()>(session_key(token), username, ttl_secs)
        .await
}

/// Get the username owning a session token.
pub async fn get_session<C>(con: &mut C, token: &str) -> Result<Option<String>, redis::RedisError>
where
    C: AsyncCommands,
{
    con.get(session_key(token)).await
}

/// Delete a session.
///
/// Returns true if the session was deleted, false if it didn't exist.
pub async fn delete_session<C>(con: &mut C, token: &str) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let deleted: i32 = con.del(session_key(token)).await?;
    Ok(deleted > 0)
}

/// [`SessionCache`] backed by Redis.
///
/// Holds a `redis::Client` and opens a multiplexed connection per call; the
/// client itself is cheap to clone and safe to share across requests.
#[derive(Clone)]
pub struct RedisSessionCache {
    client: redis::Client,
}

impl RedisSessionCache {
    pub fn new(client: redis::Client) -> Self {
        RedisSessionCache { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, SessionError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SessionError::Internal(format!("Redis connection error: {}", e)))
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn create_session(&self, username: &str, ttl: Duration) -> Result<String, SessionError> {
        let mut con = self.connection().await?;
        let token = generate_session_token();
        // SET EX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);
        store_session(&mut con, &token, username, ttl_secs).await?;
        Ok(token)
    }

    async fn verify_session(&self, token: &str) -> Result<String, SessionError> {
        let mut con = self.connection().await?;
        get_session(&mut con, token)
            .await?
            .ok_or(SessionError::NotFound)
    }

    async fn destroy_session(&self, token: &str) -> Result<(), SessionError> {
        let mut con = self.connection().await?;
        delete_session(&mut con, token).await?;
        Ok(())
    }
}
