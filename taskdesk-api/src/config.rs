/// Configuration management for the API server
///
/// Loads configuration from environment variables (and `.env` in
/// development) into a typed struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `APP_ENV`: `production` enables HSTS (default: development)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_IDLE_TIMEOUT_SECS`: Idle connection lifetime (default: 30)
/// - `JWT_SECRET`: Secret key for token signing (required, 32+ characters)
/// - `JWT_EXPIRES_IN`: Token lifetime, e.g. `3600`, `45m`, `1h`, `7d` (default: 1h)
/// - `PG_DUMP_PATH`: `pg_dump` executable used for exports (default: `pg_dump`)
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use std::collections::HashMap;
use std::env;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub backup: BackupConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,

    /// Enables production-only headers such as HSTS
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub idle_timeout_seconds: u64,
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// IMPORTANT: keep secret. Generate with `openssl rand -hex 32`.
    pub secret: String,

    pub expires_in: Duration,
}

/// Database export configuration
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub pg_dump_path: String,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(&env::vars().collect())
    }

    /// Builds configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| vars.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let host = get("API_HOST").unwrap_or("0.0.0.0").to_string();
        let port = get("API_PORT")
            .unwrap_or("3000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or("*")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?
            .to_string();

        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or("10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        let idle_timeout_seconds = get("DATABASE_IDLE_TIMEOUT_SECS")
            .unwrap_or("30")
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_IDLE_TIMEOUT_SECS: {}", e))?;

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?
            .to_string();

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let expires_in = parse_duration(get("JWT_EXPIRES_IN").unwrap_or("1h"))?;

        let pg_dump_path = get("PG_DUMP_PATH").unwrap_or("pg_dump").to_string();

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                idle_timeout_seconds,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expires_in,
            },
            backup: BackupConfig { pg_dump_path },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for [`taskdesk_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> taskdesk_shared::db::pool::DatabaseConfig {
        taskdesk_shared::db::pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            idle_timeout_seconds: self.database.idle_timeout_seconds,
            ..Default::default()
        }
    }
}

/// Parses a token lifetime: plain seconds, or a number with an `s`, `m`, `h`
/// or `d` suffix
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    let value = value.trim();
    let (number, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], c.to_ascii_lowercase()),
        _ => (value, 's'),
    };

    let amount: i64 = number
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration '{}'", value))?;

    if amount <= 0 {
        anyhow::bail!("Duration must be positive, got '{}'", value);
    }

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        other => anyhow::bail!("Unknown duration unit '{}' in '{}'", other, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("DATABASE_URL", "postgresql://localhost/taskdesk"),
            ("JWT_SECRET", SECRET),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (k, v) in pairs {
            map.insert(k.to_string(), v.to_string());
        }
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&vars(&[])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(!config.api.production);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.idle_timeout_seconds, 30);
        assert_eq!(config.jwt.expires_in, Duration::hours(1));
        assert_eq!(config.backup.pg_dump_path, "pg_dump");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(&vars(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("APP_ENV", "production"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("JWT_EXPIRES_IN", "7d"),
            ("PG_DUMP_PATH", "/usr/bin/pg_dump"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.api.production);
        assert_eq!(config.pool_config().max_connections, 4);
        assert_eq!(config.jwt.expires_in, Duration::days(7));
        assert_eq!(config.backup.pg_dump_path, "/usr/bin/pg_dump");
    }

    #[test]
    fn test_required_variables() {
        let mut missing_db = vars(&[]);
        missing_db.remove("DATABASE_URL");
        assert!(Config::from_vars(&missing_db).is_err());

        let mut missing_secret = vars(&[]);
        missing_secret.remove("JWT_SECRET");
        assert!(Config::from_vars(&missing_secret).is_err());

        assert!(Config::from_vars(&vars(&[("JWT_SECRET", "short")])).is_err());
        assert!(Config::from_vars(&vars(&[("API_PORT", "http")])).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3600").unwrap(), Duration::seconds(3600));
        assert_eq!(parse_duration("90s").unwrap(), Duration::seconds(90));
        assert_eq!(parse_duration("45m").unwrap(), Duration::minutes(45));
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("2D").unwrap(), Duration::days(2));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-5m").is_err());
        assert!(parse_duration("3w").is_err());
    }
}
