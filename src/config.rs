/*
 * Responsibility
 * - 環境変数や設定の読み込み (Auth 設定, public paths, timeouts, backend URL など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PUBLIC_PATHS: &str = "/api/public/**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,
    pub access_jwt_public_key_pem: String,

    pub public_paths: Vec<String>,
    pub token_verify_timeout: Duration,
    pub profile_store_timeout: Duration,

    // None in development falls back to in-memory backends.
    pub database_url: Option<String>,
    pub redis_url: Option<String>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = var("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let auth_issuer = var("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
        let auth_audience = var("AUTH_AUDIENCE").ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let access_token_leeway_seconds = var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let access_jwt_public_key_pem = var("ACCESS_JWT_PUBLIC_KEY_PEM")
            .ok_or(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?
            .replace("\\n", "\n");

        let public_paths = var("PUBLIC_PATHS")
            .unwrap_or_else(|| DEFAULT_PUBLIC_PATHS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if public_paths.iter().any(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid("PUBLIC_PATHS"));
        }

        let token_verify_timeout = millis(var("TOKEN_VERIFY_TIMEOUT_MS"), 2_000);
        let profile_store_timeout = millis(var("PROFILE_STORE_TIMEOUT_MS"), 2_000);

        let database_url = var("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let redis_url = var("REDIS_URL").filter(|s| !s.trim().is_empty());
        if app_env.is_production() {
            if database_url.is_none() {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
            if redis_url.is_none() {
                return Err(ConfigError::Missing("REDIS_URL"));
            }
        }

        let request_timeout = Duration::from_secs(
            var("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        let request_body_limit_bytes = var("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            access_jwt_public_key_pem,
            public_paths,
            token_verify_timeout,
            profile_store_timeout,
            database_url,
            redis_url,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}

fn millis(raw: Option<String>, default_ms: u64) -> Duration {
    Duration::from_millis(
        raw.and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(default_ms),
    )
}
