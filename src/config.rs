use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    // Backends
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // Session TTLs (in seconds)
    pub session_ttl_secs: u64,
    pub persistent_session_ttl_secs: u64,

    // Cookie
    pub session_cookie_secure: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field(
                "persistent_session_ttl_secs",
                &self.persistent_session_ttl_secs,
            )
            .field("session_cookie_secure", &self.session_cookie_secure)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; production sets vars directly
        let _ = dotenvy::dotenv();

        let database_url = required_var("DATABASE_URL")?;
        let redis_url = required_var("REDIS_URL")?;

        let database_max_connections = parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // TTLs
        let session_ttl_secs = parse_env_or_default("SESSION_TTL_SECS", 3_600)?;
        let persistent_session_ttl_secs =
            parse_env_or_default("PERSISTENT_SESSION_TTL_SECS", 2_592_000)?;

        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if persistent_session_ttl_secs <= session_ttl_secs {
            return Err(ConfigError::InvalidValue(
                "PERSISTENT_SESSION_TTL_SECS".to_string(),
                "must be greater than SESSION_TTL_SECS".to_string(),
            ));
        }

        let session_cookie_secure = parse_env_or_default("SESSION_COOKIE_SECURE", false)?;

        Ok(Config {
            database_url,
            database_max_connections,
            redis_url,
            bind_addr,
            session_ttl_secs,
            persistent_session_ttl_secs,
            session_cookie_secure,
        })
    }

    /// Lifetime of a new session: long when remembered, short otherwise.
    pub fn session_ttl(&self, persist: bool) -> Duration {
        if persist {
            Duration::from_secs(self.persistent_session_ttl_secs)
        } else {
            Duration::from_secs(self.session_ttl_secs)
        }
    }
}

fn required_var(key: &str) -> Result<String, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "cannot be empty".to_string(),
        ));
    }
    Ok(value)
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests mutate process env vars, so run them one at a time.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn lock_test() -> std::sync::MutexGuard<'static, ()> {
        TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_test_env() {
        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
        env::remove_var("REDIS_URL");
        env::remove_var("BIND_ADDR");
        env::remove_var("SESSION_TTL_SECS");
        env::remove_var("PERSISTENT_SESSION_TTL_SECS");
        env::remove_var("SESSION_COOKIE_SECURE");
    }

    fn set_required() {
        env::set_var("DATABASE_URL", "postgres://panurge@localhost/panurge");
        env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_parse_env_or_default() {
        let _guard = lock_test();

        env::set_var("PANURGE_TEST_U64", "12345");
        let result: Result<u64, ConfigError> = parse_env_or_default("PANURGE_TEST_U64", 100);
        assert_eq!(result.unwrap(), 12345);

        env::remove_var("PANURGE_TEST_U64");
        let result: Result<u64, ConfigError> = parse_env_or_default("PANURGE_TEST_U64", 100);
        assert_eq!(result.unwrap(), 100);
    }

    #[test]
    fn test_config_defaults() {
        let _guard = lock_test();
        clear_test_env();
        set_required();

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "postgres://panurge@localhost/panurge");
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.session_ttl_secs, 3_600);
        assert_eq!(config.persistent_session_ttl_secs, 2_592_000);
        assert!(!config.session_cookie_secure);

        clear_test_env();
    }

    #[test]
    fn test_missing_database_url() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
        // Empty rather than unset so a stray .env cannot fill it in
        env::set_var("DATABASE_URL", "");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "DATABASE_URL"
        ));

        clear_test_env();
    }

    #[test]
    fn test_invalid_socket_addr() {
        let _guard = lock_test();
        clear_test_env();
        set_required();
        env::set_var("BIND_ADDR", "invalid_address");

        let result = Config::from_env();
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_, _)));

        clear_test_env();
    }

    #[test]
    fn test_persistent_ttl_must_exceed_transient() {
        let _guard = lock_test();
        clear_test_env();
        set_required();
        env::set_var("SESSION_TTL_SECS", "600");
        env::set_var("PERSISTENT_SESSION_TTL_SECS", "600");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "PERSISTENT_SESSION_TTL_SECS"
        ));

        clear_test_env();
    }

    #[test]
    fn test_zero_session_ttl_rejected() {
        let _guard = lock_test();
        clear_test_env();
        set_required();
        env::set_var("SESSION_TTL_SECS", "0");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "SESSION_TTL_SECS"
        ));

        clear_test_env();
    }

    #[test]
    fn test_bad_secure_flag() {
        let _guard = lock_test();
        clear_test_env();
        set_required();
        env::set_var("SESSION_COOKIE_SECURE", "maybe");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ParseError(ref s, _) if s == "SESSION_COOKIE_SECURE"
        ));

        clear_test_env();
    }

    #[test]
    fn test_session_ttl_tiers() {
        let _guard = lock_test();
        clear_test_env();
        set_required();

        let config = Config::from_env().unwrap();
        assert_eq!(config.session_ttl(false), Duration::from_secs(3_600));
        assert_eq!(config.session_ttl(true), Duration::from_secs(2_592_000));

        clear_test_env();
    }

    #[test]
    fn test_debug_redacts_urls() {
        let _guard = lock_test();
        clear_test_env();
        set_required();

        let config = Config::from_env().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("postgres://"));
        assert!(!debug.contains("redis://"));

        clear_test_env();
    }
}
