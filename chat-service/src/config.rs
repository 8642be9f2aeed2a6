//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: CHAT_, nested keys split on `__`,
//!    e.g. `CHAT_DATABASE__URL`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/chat-service/config.toml
//! 4. System directory: /etc/chat-service/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::query::{BetweenMode, CompilerOptions, NotInMode, SortStyle};

const ENV_PREFIX: &str = "CHAT_";
const CONFIG_DIR: &str = "chat-service";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Token signing and validation
    pub jwt: JwtConfig,

    /// Argon2id cost parameters
    #[serde(default)]
    pub password: PasswordConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Filter query compatibility switches
    #[serde(default)]
    pub query: QueryConfig,

    /// API documentation and its login page
    #[serde(default)]
    pub docs: DocsConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// JWT configuration
///
/// Tokens are signed and validated with the same shared secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret
    pub secret: String,

    /// JWT algorithm (HS256, HS384, HS512)
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    /// Issuer written into and required on every token
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Token lifetime in hours
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
}

impl JwtConfig {
    /// Token lifetime
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expiry_hours * 3600)
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

/// Password hashing configuration
///
/// Default values are based on OWASP recommendations for Argon2id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    #[serde(default = "default_memory_cost")]
    pub memory_cost_kib: u32,

    /// Time cost / iterations (default: 3)
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,

    /// Parallelism degree (default: 4)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing database connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Run the embedded migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request tracking configuration (request IDs, header propagation)
    #[serde(default)]
    pub request_tracking: RequestTrackingConfig,

    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS configuration (permissive, restrictive, disabled)
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            request_tracking: RequestTrackingConfig::default(),
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            compression: true,
            cors_mode: default_cors_mode(),
        }
    }
}

/// Request tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTrackingConfig {
    /// Enable request ID generation
    #[serde(default = "default_true")]
    pub request_id_enabled: bool,

    /// Enable header propagation
    #[serde(default = "default_true")]
    pub propagate_headers: bool,

    /// Enable sensitive header masking in logs
    #[serde(default = "default_true")]
    pub mask_sensitive_headers: bool,
}

impl Default for RequestTrackingConfig {
    fn default() -> Self {
        Self {
            request_id_enabled: true,
            propagate_headers: true,
            mask_sensitive_headers: true,
        }
    }
}

/// Filter query compatibility switches
///
/// All off by default. Turning one on reproduces the historical query shape
/// for clients that depend on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Bind `between` as a single argument
    #[serde(default)]
    pub legacy_between: bool,

    /// Bind `nin` lists as a single argument
    #[serde(default)]
    pub legacy_not_in: bool,

    /// Emit one ORDER BY clause per sort key
    #[serde(default)]
    pub repeated_order_by: bool,
}

impl QueryConfig {
    /// Compiler modes selected by these switches
    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            between: if self.legacy_between {
                BetweenMode::Literal
            } else {
                BetweenMode::Pair
            },
            not_in: if self.legacy_not_in {
                NotInMode::Literal
            } else {
                NotInMode::Expanded
            },
            sort: if self.repeated_order_by {
                SortStyle::Repeated
            } else {
                SortStyle::Joined
            },
        }
    }
}

/// API documentation configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Serve the Swagger UI and its login page
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Docs login user name
    #[serde(default)]
    pub username: String,

    /// Docs login password
    #[serde(default)]
    pub password: String,

    /// Lifetime of a docs login session in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Public host advertised in the OpenAPI document, e.g. `api.example.com`
    #[serde(default)]
    pub host_url: String,

    /// Schemes advertised together with `host_url`
    #[serde(default = "default_schemes")]
    pub schemes: Vec<String>,

    /// Mark the session cookie `Secure`
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

impl DocsConfig {
    /// Session lifetime
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Whether the login form can succeed at all
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: String::new(),
            password: String::new(),
            session_ttl_secs: default_session_ttl(),
            host_url: String::new(),
            schemes: default_schemes(),
            secure_cookie: true,
        }
    }
}

impl std::fmt::Debug for DocsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsConfig")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("host_url", &self.host_url)
            .field("schemes", &self.schemes)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_jwt_issuer() -> String {
    "Chat-App-Server".to_string()
}

fn default_expiry_hours() -> u64 {
    24
}

fn default_memory_cost() -> u32 {
    65536
}

fn default_time_cost() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

fn default_max_connections() -> u32 {
    50
}

fn default_min_connections() -> u32 {
    5
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 3600
}

fn default_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found is used):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/chat-service/config.toml
    /// 3. System directory: /etc/chat-service/config.toml
    ///
    /// Environment variables (CHAT_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment.merge(Self::env()).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses XDG directories and loads directly from the given path.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    /// Config file paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(CONFIG_DIR).join("config.toml"));
        paths
    }

    /// Get database URL
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Compiler modes for filter queries
    pub fn compiler_options(&self) -> CompilerOptions {
        self.query.compiler_options()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "chat-service".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            jwt: JwtConfig {
                secret: String::new(),
                algorithm: default_jwt_algorithm(),
                issuer: default_jwt_issuer(),
                expiry_hours: default_expiry_hours(),
            },
            password: PasswordConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost:5432/chat".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connection_timeout_secs: default_connection_timeout(),
                max_retries: default_max_retries(),
                retry_delay_secs: default_retry_delay(),
                auto_migrate: true,
            },
            middleware: MiddlewareConfig::default(),
            query: QueryConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.jwt.issuer, "Chat-App-Server");
        assert_eq!(config.jwt.lifetime(), Duration::from_secs(24 * 3600));
        assert_eq!(config.docs.session_ttl_secs, 86400);
        assert_eq!(config.middleware.body_limit_mb, 10);
    }

    #[test]
    fn test_default_compiler_options_are_corrected() {
        assert_eq!(Config::default().compiler_options(), CompilerOptions::default());
    }

    #[test]
    fn test_legacy_switches_select_literal_modes() {
        let query = QueryConfig {
            legacy_between: true,
            legacy_not_in: true,
            repeated_order_by: true,
        };
        assert_eq!(query.compiler_options(), CompilerOptions::literal());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "chat-test"
port = 9090

[jwt]
secret = "s3cret"
expiry_hours = 2

[database]
url = "postgres://chat@db/chat"
auto_migrate = false

[query]
repeated_order_by = true
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.service.name, "chat-test");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.jwt.expiry_hours, 2);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.database_url(), "postgres://chat@db/chat");
        assert!(!config.database.auto_migrate);
        assert_eq!(config.compiler_options().sort, SortStyle::Repeated);
        assert_eq!(config.compiler_options().between, BetweenMode::Pair);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let mut config = Config::default();
        config.jwt.secret = "top-secret".to_string();
        config.docs.password = "hunter2".to_string();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
