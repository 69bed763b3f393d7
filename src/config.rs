use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub locale: LocaleConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "PORTAL_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORTAL_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (health probes)
    #[arg(long, env = "PORTAL_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for in-flight requests during shutdown
    #[arg(long, env = "PORTAL_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret the identity provider signs access tokens with
    #[arg(long, env = "PORTAL_JWT_SECRET")]
    pub jwt_secret: String,

    /// Expected `aud` claim of access tokens
    #[arg(long, env = "PORTAL_JWT_AUDIENCE", default_value = "authenticated")]
    pub jwt_audience: String,

    /// Clock skew tolerated when checking token expiry, in seconds
    #[arg(long, env = "PORTAL_JWT_LEEWAY_SECS", default_value_t = 0)]
    pub jwt_leeway_secs: u64,

    /// Cookie carrying the access token for browser requests
    #[arg(long, env = "PORTAL_ACCESS_COOKIE", default_value = "sb-access-token")]
    pub access_cookie: String,

    /// Cookie carrying the refresh token for browser requests
    #[arg(long, env = "PORTAL_REFRESH_COOKIE", default_value = "sb-refresh-token")]
    pub refresh_cookie: String,
}

#[derive(Clone, Debug, Args)]
pub struct LocaleConfig {
    /// Comma-separated list of locales served under `/{locale}/...`
    #[arg(long = "locales", env = "PORTAL_LOCALES", default_value = "en,de", value_delimiter = ',')]
    pub supported: Vec<String>,

    /// Locale used when the request expresses no supported preference
    #[arg(long, env = "PORTAL_DEFAULT_LOCALE", default_value = "en")]
    pub default_locale: String,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the identity provider readiness check in milliseconds
    #[arg(long, env = "PORTAL_HEALTH_IDENTITY_TIMEOUT_MS", default_value_t = 2000)]
    pub identity_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "PORTAL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; export is disabled when unset
    #[arg(long, env = "PORTAL_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
