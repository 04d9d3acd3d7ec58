use std::env;
use std::net::SocketAddr;

/// Valid bcrypt cost range; values outside are rejected at startup rather
/// than failing on the first registration.
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Clone)]
pub struct Config {
    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // Auth
    pub session_ttl_secs: u64,
    pub bcrypt_cost: u32,

    // Limits
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_body_bytes", &self.max_body_bytes)
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
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // Redis — required to prevent silent unauthenticated connections
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // Auth: sessions run on a fixed TTL, one hour by default
        let session_ttl_secs = parse_env_or_default("SESSION_TTL_SECS", 3_600)?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let bcrypt_cost = parse_env_or_default("BCRYPT_COST", 10)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "BCRYPT_COST".to_string(),
                format!("must be {}-{}", MIN_BCRYPT_COST, MAX_BCRYPT_COST),
            ));
        }

        // Limits
        let max_body_bytes = parse_env_or_default("MAX_BODY_BYTES", 65_536)?;

        Ok(Config {
            redis_url,
            bind_addr,
            session_ttl_secs,
            bcrypt_cost,
            max_body_bytes,
        })
    }
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
