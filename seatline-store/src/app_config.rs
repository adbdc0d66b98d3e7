use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    3
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    #[serde(default)]
    pub backend: NotifierBackend,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    100
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::default(),
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String {
    "seatline:bookings".to_string()
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            channel: default_channel(),
        }
    }
}

/// Reset codes seeded into the admin code store at startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub codes: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // SEATLINE__DATABASE__URL=... sets database.url
            .add_source(
                config::Environment::with_prefix("SEATLINE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.codes")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml("[server]\nport = 8080\n").expect("Failed to parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.notifier.backend, NotifierBackend::Memory);
        assert_eq!(config.notifier.capacity, 100);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.redis.channel, "seatline:bookings");
        assert!(config.admin.codes.is_empty());
    }

    #[test]
    fn test_full_config() {
        let source = r#"
            [server]
            port = 3000

            [store]
            backend = "postgres"

            [database]
            url = "postgres://localhost/seatline"
            max_connections = 10

            [notifier]
            backend = "redis"
            capacity = 32

            [redis]
            url = "redis://127.0.0.1/"
            channel = "fleet:changes"

            [admin]
            codes = ["RESET2024", "DEPOT"]
        "#;
        let config = Config::from_toml(source).expect("Failed to parse");
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.database.url, "postgres://localhost/seatline");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.acquire_timeout_seconds, 3);
        assert_eq!(config.notifier.backend, NotifierBackend::Redis);
        assert_eq!(config.notifier.capacity, 32);
        assert_eq!(config.redis.channel, "fleet:changes");
        assert_eq!(config.admin.codes, vec!["RESET2024", "DEPOT"]);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let source = "[server]\nport = 1\n[store]\nbackend = \"sqlite\"\n";
        assert!(Config::from_toml(source).is_err());
    }
}
