//! CLI application for the SurfsUp climate query service.

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use surfsup_api::{create_router, metrics_router, run_server, AppState, SqliteClimateStore};
use surfsup_db::{DbError, DbPool};
use surfsup_telemetry::{init_logging, LogFormat, Metrics};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "surfsup")]
#[command(about = "Read-only JSON API over the Hawaii climate dataset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Database path
        #[arg(long, env = "SURFSUP_DATABASE", default_value = "Resources/hawaii.sqlite")]
        database_path: String,

        /// HTTP bind address
        #[arg(long, env = "SURFSUP_BIND_ADDRESS", default_value = "127.0.0.1:5000")]
        bind_address: String,

        /// Metrics bind address; metrics are not served when omitted
        #[arg(long, env = "SURFSUP_METRICS_ADDRESS")]
        metrics_bind_address: Option<String>,

        /// Maximum pooled database connections
        #[arg(long, env = "SURFSUP_MAX_CONNECTIONS", default_value = "10")]
        max_connections: u32,

        /// Log level
        #[arg(long, env = "SURFSUP_LOG")]
        log_level: Option<String>,

        /// Log format (json or pretty)
        #[arg(long, env = "SURFSUP_LOG_FORMAT", default_value = "json")]
        log_format: LogFormat,
    },
    /// Validate the database schema and print a summary of its contents
    Inspect {
        /// Database path
        #[arg(long, env = "SURFSUP_DATABASE", default_value = "Resources/hawaii.sqlite")]
        database_path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            database_path,
            bind_address,
            metrics_bind_address,
            max_connections,
            log_level,
            log_format,
        } => {
            init_logging(log_level.as_deref(), log_format)?;
            serve(
                &database_path,
                &bind_address,
                metrics_bind_address.as_deref(),
                max_connections,
            )
            .await?;
        }
        Commands::Inspect { database_path } => {
            init_logging(Some("warn"), LogFormat::Pretty)?;
            let report = inspect(&database_path).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn open_database(db_path: &str, max_connections: u32) -> anyhow::Result<DbPool> {
    let db = DbPool::with_max_connections(db_path, max_connections)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    db.validate_schema()
        .await
        .with_context(|| format!("Database at {} does not match the expected schema", db_path))?;
    Ok(db)
}

async fn serve(
    db_path: &str,
    bind_addr: &str,
    metrics_addr: Option<&str>,
    max_connections: u32,
) -> anyhow::Result<()> {
    info!("Starting SurfsUp climate query service v{}", env!("CARGO_PKG_VERSION"));

    let db = open_database(db_path, max_connections).await?;
    let metrics = Metrics::new()?;
    if let Some(addr) = metrics_addr {
        start_metrics_server(addr, metrics.clone()).await?;
    }

    let app = build_app(&db, metrics).await?;
    run_server(bind_addr, app).await?;

    db.close().await;
    info!("Service stopped");
    Ok(())
}

/// Build the router over an opened database.
///
/// An empty `measurement` table is served as is; only the lookback routes
/// fail on it.
async fn build_app(db: &DbPool, metrics: Metrics) -> anyhow::Result<Router> {
    let summary = match db.dataset_summary().await {
        Ok(summary) => {
            info!(
                first_date = %summary.first_date,
                last_date = %summary.last_date,
                stations = summary.station_count,
                observations = summary.observation_count,
                "Loaded dataset"
            );
            Some(summary)
        }
        Err(DbError::EmptyDataset) => {
            warn!("Database contains no observations");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let store = SqliteClimateStore::new(db.clone(), metrics.clone());
    let state = AppState::new(Arc::new(store), metrics, summary);
    Ok(create_router(Arc::new(state)))
}

async fn inspect(db_path: &str) -> anyhow::Result<surfsup_db::DatasetSummary> {
    let db = open_database(db_path, 1).await?;
    let summary = db.dataset_summary().await?;
    db.close().await;
    Ok(summary)
}

async fn start_metrics_server(addr: &str, metrics: Metrics) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener on {}", addr))?;
    info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = surfsup_api::serve(listener, metrics_router(metrics)).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}
