use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Name of the refresh cookie. Unlike the access cookie it is not configurable.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub root: Option<RootConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:imbds.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Token signing and lifetime settings.
///
/// `secret` has no default: a missing signing key must stop the process at
/// startup.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime_seconds: i64,
    #[serde(default = "default_refresh_token_lifetime")]
    pub refresh_token_lifetime_seconds: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Lets unauthenticated callers create principals.
    #[serde(default)]
    pub open_registration: bool,
}

fn default_access_token_lifetime() -> i64 {
    5 * 60
}

fn default_refresh_token_lifetime() -> i64 {
    24 * 60 * 60
}

fn default_issuer() -> String {
    "imbds".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameSitePolicy {
    #[default]
    #[serde(alias = "lax", alias = "LAX")]
    Lax,
    #[serde(alias = "strict", alias = "STRICT")]
    Strict,
    #[serde(alias = "none", alias = "NONE")]
    None,
}

/// Attributes applied to both session cookies.
///
/// Each field falls back to its own default, so a deployment that omits the
/// whole `[cookie]` table still reads and writes `access_token`.
#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    #[serde(default = "default_access_cookie_name")]
    pub access_name: String,
    #[serde(default = "default_http_only")]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: SameSitePolicy,
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: default_access_cookie_name(),
            http_only: default_http_only(),
            secure: false,
            same_site: SameSitePolicy::default(),
            path: default_cookie_path(),
        }
    }
}

fn default_access_cookie_name() -> String {
    "access_token".to_string()
}

fn default_http_only() -> bool {
    true
}

fn default_cookie_path() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Admin principal created on first start when missing.
#[derive(Debug, Deserialize, Clone)]
pub struct RootConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (IMBDS__AUTH__SECRET, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("IMBDS")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("auth.secret", jwt_secret)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Parse configuration from a TOML string, without touching the environment.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.auth.access_token_lifetime_seconds <= 0 {
            return Err("Access token lifetime must be greater than 0".to_string());
        }
        if self.auth.access_token_lifetime_seconds >= self.auth.refresh_token_lifetime_seconds {
            return Err("Access token lifetime must be shorter than refresh token lifetime".to_string());
        }
        if self.cookie.access_name.is_empty() {
            return Err("Access cookie name must not be empty".to_string());
        }
        if self.cookie.access_name == REFRESH_COOKIE_NAME {
            return Err(format!(
                "Access cookie name must differ from '{REFRESH_COOKIE_NAME}'"
            ));
        }
        if self.cookie.same_site == SameSitePolicy::None && !self.cookie.secure {
            return Err("SameSite=None cookies require secure = true".to_string());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        Ok(())
    }
}
