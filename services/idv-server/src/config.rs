//! Server configuration: file + `IDV_`-prefixed env, `__`-separated,
//! `clap`-derived CLI overrides layered on top.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), shutdown_timeout_secs: default_shutdown_timeout() }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().expect("invalid socket address")
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn default_risk_engine_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_risk_timeout_secs() -> u64 {
    5
}

/// Not `pub postgres_url: String` like the database config it's
/// grounded on - `postgres_url` is optional here. An unset value means
/// the orchestrator runs entirely on the in-memory store/ledger, which
/// the spec treats as a valid instance of "a single primary data store".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub postgres_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            postgres_url: None,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskEngineSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RiskEngineSettings {
    fn default() -> Self {
        Self { base_url: default_risk_engine_url(), timeout_secs: default_risk_timeout_secs() }
    }
}

impl RiskEngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub persistence: PersistenceSettings,
    pub risk_engine: RiskEngineSettings,
    pub logging: LoggingSettings,
}

impl ServerConfig {
    /// Load from `config/default.{toml,yaml,json}`, `config/local.*`, then
    /// `IDV_`-prefixed environment variables, falling back to defaults if
    /// nothing parses - there is no required field, unlike the teacher's
    /// `database.postgres_url`, since an absent Postgres URL is itself a
    /// meaningful configuration (in-memory mode).
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("IDV").separator("__").try_parsing(true));

        let built = builder.build()?;

        let server_config: ServerConfig = built.try_deserialize().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default configuration - some settings may need adjustment");
            ServerConfig::default()
        });

        Ok(server_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_postgres_url() {
        let config = ServerConfig::default();
        assert!(config.persistence.postgres_url.is_none());
        assert_eq!(config.server.port, 8080);
    }
}
