// Photo album server
// Entry point, command-line parsing and server startup

use anyhow::Context;
use clap::{Parser, Subcommand};
use photoalbum::config::{
    ServerConfig, DEFAULT_ALBUMS_DIR, DEFAULT_BIND_ADDR, DEFAULT_DATABASE_PATH,
    DEFAULT_MAX_SCAN_ENTRIES,
};
use photoalbum::{api, app};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "photoalbum", version, about = "Personal photo album server")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "PHOTOALBUM_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    /// Directory holding one folder per album
    #[arg(long, env = "PHOTOALBUM_ALBUMS_DIR", default_value = DEFAULT_ALBUMS_DIR)]
    albums_dir: PathBuf,

    /// Address the HTTP server listens on
    #[arg(long, env = "PHOTOALBUM_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: SocketAddr,

    /// Email of the user that owns albums created by sync
    #[arg(long, env = "PHOTOALBUM_DEFAULT_OWNER")]
    default_owner: Option<String>,

    /// Largest number of entries a single folder scan may read
    #[arg(long, env = "PHOTOALBUM_MAX_SCAN_ENTRIES", default_value_t = DEFAULT_MAX_SCAN_ENTRIES)]
    max_scan_entries: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an admin user if it does not exist yet
    Seed {
        #[arg(long, default_value = "admin@example.com")]
        email: String,
        #[arg(long, env = "PHOTOALBUM_SEED_PASSWORD")]
        password: String,
        #[arg(long, default_value = "Admin")]
        name: String,
    },
    /// Sync every album folder into the database once and print the report
    Sync {
        /// Report the changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        let mut config =
            ServerConfig::new(self.database.clone(), self.albums_dir.clone(), self.bind);
        config.default_owner_email = self.default_owner.clone();
        config.max_scan_entries = self.max_scan_entries;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoalbum=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.server_config();

    tracing::info!("Starting photo album server");

    let state = app::setup(config.clone())
        .await
        .context("failed to initialize application")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let listener = TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.bind_addr))?;

            tracing::info!("Listening on http://{}", listener.local_addr()?);

            axum::serve(listener, api::router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server error")?;
        }
        Command::Seed {
            email,
            password,
            name,
        } => {
            let user = state
                .auth_service
                .seed_admin(&email, &password, &name)
                .await
                .context("failed to seed admin user")?;
            tracing::info!("Admin user ready: {}", user.email);
        }
        Command::Sync { dry_run } => {
            let report = state
                .sync_service
                .sync_all(dry_run)
                .await
                .context("sync failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
