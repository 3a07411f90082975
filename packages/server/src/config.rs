use config::{Config, ConfigError, Environment, File};
use devicefarm::DeviceFarmConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Log every SQL statement. Default: false.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens. Default: 168 (7 days).
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

/// Remote-session polling hints handed to clients.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Suggested delay between two status polls. Default: 5.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// How long project teardown waits for stopped sessions to wind down before
/// deleting the vendor project.
#[derive(Debug, Deserialize, Clone)]
pub struct TeardownConfig {
    /// Upper bound for the wait. Default: 10000.
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,
    /// Delay between two session list probes. Default: 500.
    #[serde(default = "default_settle_poll_interval_ms")]
    pub settle_poll_interval_ms: u64,
}

fn default_settle_timeout_ms() -> u64 {
    10_000
}

fn default_settle_poll_interval_ms() -> u64 {
    500
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            settle_timeout_ms: default_settle_timeout_ms(),
            settle_poll_interval_ms: default_settle_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub vendor: DeviceFarmConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub teardown: TeardownConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://farmdeck.db?mode=rwc")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FARMDECK__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("FARMDECK").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.teardown.settle_poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "teardown.settle_poll_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
