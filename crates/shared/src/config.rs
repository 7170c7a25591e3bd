//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Public site configuration.
    pub site: SiteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret key for signing bearer tokens.
    pub jwt_secret: String,
    /// Token expiration in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend: "fs", "s3", "azblob" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Root directory (fs backend).
    #[serde(default = "default_root")]
    pub root: String,
    /// Bucket or container name (s3/azblob backends).
    #[serde(default)]
    pub bucket: String,
    /// Endpoint URL (s3 backend).
    #[serde(default)]
    pub endpoint: String,
    /// Region (s3 backend).
    #[serde(default)]
    pub region: String,
    /// Access key id (s3 backend) or account name (azblob backend).
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key (s3 backend) or account key (azblob backend).
    #[serde(default)]
    pub secret_access_key: String,
    /// Base URL under which stored objects are publicly resolvable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum accepted upload body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_backend() -> String {
    "fs".to_string()
}

fn default_root() -> String {
    "./uploads".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/files".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Public site configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL used when building resource links.
    #[serde(default = "default_site_base_url")]
    pub base_url: String,
}

fn default_site_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEAFPRESS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
