mod config;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::server::run_server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "filestore")]
#[command(about = "Chunked upload staging and asset catalog server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Server {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filestore=info,filestore_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config } => {
            if let Err(e) = serve(&config).await {
                tracing::error!("Server error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn serve(config_path: &str) -> anyhow::Result<()> {
    tracing::info!("Starting Filestore server with config: {}", config_path);

    let cfg = Config::from_file(config_path)
        .with_context(|| format!("failed to load config from {}", config_path))?;

    tracing::info!(
        "Bind: {}, data dir: {:?}, capacity threshold: {} bytes",
        cfg.bind_addr,
        cfg.storage.data_dir,
        cfg.storage.capacity_threshold_bytes
    );

    run_server(cfg).await.context("server terminated")?;
    Ok(())
}
