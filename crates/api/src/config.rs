use comanda_catalog::ResolverConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development
/// except the webhook secrets, which default to empty and disable the
/// respective check (verification always fails closed on empty).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Pre-shared token for the webhook GET subscription handshake.
    pub webhook_verify_token: String,
    /// App secret used to verify `X-Hub-Signature-256` on webhook POSTs.
    pub webhook_app_secret: String,
    /// Accept stored access tokens that predate vault encryption.
    pub legacy_plaintext_tokens: bool,
    /// Override for the external catalog API base URL (tests, proxies).
    pub catalog_api_base_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `WEBHOOK_VERIFY_TOKEN`    | empty (handshake disabled) |
    /// | `WEBHOOK_APP_SECRET`      | empty (POSTs rejected)     |
    /// | `LEGACY_PLAINTEXT_TOKENS` | `false`                    |
    /// | `CATALOG_API_BASE_URL`    | unset (platform default)   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let webhook_verify_token = std::env::var("WEBHOOK_VERIFY_TOKEN").unwrap_or_default();
        let webhook_app_secret = std::env::var("WEBHOOK_APP_SECRET").unwrap_or_default();

        let legacy_plaintext_tokens = std::env::var("LEGACY_PLAINTEXT_TOKENS")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        let catalog_api_base_url = std::env::var("CATALOG_API_BASE_URL").ok();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            webhook_verify_token,
            webhook_app_secret,
            legacy_plaintext_tokens,
            catalog_api_base_url,
        }
    }

    /// The resolver switches derived from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            legacy_plaintext_tokens: self.legacy_plaintext_tokens,
        }
    }
}
