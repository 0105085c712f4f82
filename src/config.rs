/*
 * Responsibility
 * - Load environment variables / .env (PORT, DATABASE_URL, JWT_SECRET, bypass paths, ...)
 * - Validate values (startup fails on missing/invalid required settings)
 * - A weak or missing JWT_SECRET is NOT an error here: the key manager falls back
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BYPASS_PATHS: &[&str] = &["/api/v1/auth/login", "/api/v1/auth/register"];
pub const DEFAULT_EXPIRATION_MS: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None in development -> in-memory credential store
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,

    // Signing secret; may be absent/weak (ephemeral key fallback)
    pub jwt_secret: Option<String>,
    // Access token lifetime (milliseconds)
    pub jwt_expiration_ms: i64,
    // Exact-match request paths that skip authentication
    pub bypass_paths: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret or the database credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<set>"))
            .field("jwt_expiration_ms", &self.jwt_expiration_ms)
            .field("bypass_paths", &self.bypass_paths)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let cors_allowed_origins = split_list(lookup("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let jwt_secret = lookup("JWT_SECRET");

        let jwt_expiration_ms = match lookup("JWT_EXPIRATION_MS") {
            Some(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid("JWT_EXPIRATION_MS"))?,
            None => DEFAULT_EXPIRATION_MS,
        };

        let bypass_paths = match lookup("AUTH_BYPASS_PATHS") {
            Some(s) => split_list(s),
            None => DEFAULT_BYPASS_PATHS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            jwt_secret,
            jwt_expiration_ms,
            bypass_paths,
        })
    }
}

fn split_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
