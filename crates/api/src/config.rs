use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development; production
/// deployments override via the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Poll interval of the in-process run dispatcher in milliseconds
    /// (default: `1000`).
    pub run_poll_interval_ms: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

/// Read `var` or fall back to `default`, then parse. Panics when the
/// value does not parse so a misconfigured deployment fails at startup.
fn parsed_env<T: std::str::FromStr>(var: &str, default: &str) -> T
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(var).unwrap_or_else(|_| default.into());
    raw.parse()
        .unwrap_or_else(|e| panic!("{var} must be a valid value: {e}"))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `RUN_POLL_INTERVAL_MS`  | `1000`                     |
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_env("PORT", "3000"),
            cors_origins,
            request_timeout_secs: parsed_env("REQUEST_TIMEOUT_SECS", "30"),
            run_poll_interval_ms: parsed_env("RUN_POLL_INTERVAL_MS", "1000"),
            jwt: JwtConfig::from_env(),
        }
    }
}
