//! rosterd — the Roster daemon.
//!
//! Single binary that assembles the candidate service:
//! - Candidate store (redb)
//! - One-shot seeding from a JSON document
//! - REST API
//!
//! # Usage
//!
//! ```text
//! rosterd serve --config roster.toml --port 7070
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_core::RosterConfig;
use roster_store::CandidateStore;
use tracing::info;

#[derive(Parser)]
#[command(name = "rosterd", about = "Roster candidate service daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the candidate service (store + seeding + REST API).
    Serve {
        /// Path to roster.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the configuration file).
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rosterd=debug,roster=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port } => serve(config, port).await,
    }
}

async fn serve(config: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Roster daemon starting");

    let config = match config {
        Some(path) => RosterConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => RosterConfig::default(),
    };

    let conn = config.resolve_connection()?;

    // Ensure the database directory exists for on-disk connections.
    if conn != "memory:" {
        let db_path = conn.strip_prefix("file://").unwrap_or(&conn);
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let store = CandidateStore::open(&conn)?;
    info!("candidate store opened");

    if let Some(seed_path) = &config.seed.path {
        let report = roster_seed::seed_if_empty(&store, seed_path);
        info!(
            added = report.added,
            attempted = report.attempted,
            "seeding pass finished"
        );
    }

    let router = roster_api::build_router(store);
    let port = port.unwrap_or(config.server.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    });

    server.await?;

    info!("Roster daemon stopped");
    Ok(())
}
