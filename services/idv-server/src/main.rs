//! Identity verification orchestrator - HTTP server binary.
//!
//! Wires the event ledger, workflow store, risk client and decision
//! authority into an [`idv_engine::Engine`], mounts it behind
//! `idv_api::router`, and serves it with graceful shutdown.

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use idv_db::Database;
use idv_engine::Engine;
use idv_ledger::{EventLedger, InMemoryLedger};
use idv_risk_client::{HttpRiskClient, RiskClient};
use idv_store::{InMemoryManualDecisionStore, InMemoryStore, ManualDecisionStore, WorkflowStore};

use crate::config::ServerConfig;

/// Identity verification orchestrator
#[derive(Parser, Debug)]
#[command(name = "idv-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "IDV_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "IDV_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "IDV_PORT")]
    port: Option<u16>,

    /// Postgres connection URL. Unset runs entirely on the in-memory
    /// store and ledger.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL of the external risk evaluation service
    #[arg(long, env = "RISK_ENGINE_URL")]
    risk_engine_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "IDV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "IDV_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.persistence.postgres_url = Some(db_url);
    }
    if let Some(risk_url) = args.risk_engine_url {
        server_config.risk_engine.base_url = risk_url;
    }
    if let Some(level) = args.log_level {
        server_config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        server_config.logging.format = format;
    }

    init_logging(&server_config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting idv-server");

    let (store, ledger, manual_decisions) = init_persistence(&server_config.persistence).await?;
    let risk_client = init_risk_client(&server_config.risk_engine);

    let engine = Arc::new(Engine::new(store, ledger, risk_client, manual_decisions).with_risk_timeout(
        server_config.risk_engine.timeout(),
    ));
    let state = Arc::new(idv_api::AppState::new(engine));
    let app = idv_api::router(state);

    let addr = server_config.server.socket_addr();
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn init_logging(config: &config::LoggingSettings) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).init(),
        _ => subscriber.with(fmt::layer().pretty().with_target(true)).init(),
    }

    Ok(())
}

type Persistence = (Arc<dyn WorkflowStore>, Arc<dyn EventLedger>, Arc<dyn ManualDecisionStore>);

/// Postgres-backed persistence when a connection URL is configured,
/// falling back to the in-memory store/ledger otherwise - the spec
/// requires "a single primary data store", not necessarily a durable one.
async fn init_persistence(config: &config::PersistenceSettings) -> anyhow::Result<Persistence> {
    let Some(postgres_url) = &config.postgres_url else {
        tracing::info!("no DATABASE_URL configured, running on the in-memory store and ledger");
        return Ok((
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryManualDecisionStore::new()),
        ));
    };

    let db_config = idv_db::DatabaseConfig {
        postgres_url: postgres_url.clone(),
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        acquire_timeout_secs: config.acquire_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;
    if config.run_migrations {
        db.migrate().await?;
    }

    let healthy = db.health_check().await?;
    if !healthy {
        anyhow::bail!("database health check failed");
    }

    Ok((Arc::new(db.workflow_store()), Arc::new(db.event_ledger()), Arc::new(db.manual_decision_store())))
}

fn init_risk_client(config: &config::RiskEngineSettings) -> Arc<dyn RiskClient> {
    Arc::new(HttpRiskClient::with_timeout(config.base_url.clone(), config.timeout()))
}

/// Ctrl+C or SIGTERM, then a bounded grace period for in-flight requests.
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received sigterm, shutting down"),
    }

    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_port_override() {
        let args = Args::parse_from(["idv-server", "--port", "9090"]);
        assert_eq!(args.port, Some(9090));
    }
}
