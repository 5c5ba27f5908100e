//! The `confab` binary: loads configuration, wires the relay together,
//! and serves the ingress endpoints.

use clap::{Parser, Subcommand};
use confab_gateway::GatewayServer;
use confab_provider::{ProviderConfig, ProviderGateway};
use confab_relay::{ChatOrchestrator, OrchestratorSettings, SessionRegistry};
use confab_store::{FileTranscriptStore, MemoryTranscriptStore, TranscriptStore};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confab", about = "Confab — real-time chat relay")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "confab.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Keep transcripts in memory only (demo mode, nothing persists
        /// across restarts)
        #[arg(long)]
        in_memory: bool,
    },
}

#[derive(Deserialize)]
struct ConfabConfig {
    provider: ProviderConfig,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    /// Advisory TTL for sessions minted on first message, in seconds.
    #[serde(default = "default_demo_ttl_secs")]
    demo_session_ttl_secs: u64,
    /// Upper bound on a single generation call, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    generation_timeout_secs: u64,
    /// Most recent N messages sent as context; unset means full history.
    #[serde(default)]
    context_window: Option<usize>,
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_demo_ttl_secs() -> u64 {
    600
}
fn default_generation_timeout_secs() -> u64 {
    30
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let config: ConfabConfig = toml::from_str(&config_str)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            in_memory,
        } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            // Fail fast on unusable provider setup, before binding.
            let provider = Arc::new(ProviderGateway::new(config.provider)?);

            let store: Arc<dyn TranscriptStore> = if in_memory {
                info!("using in-memory transcript store");
                Arc::new(MemoryTranscriptStore::new())
            } else {
                Arc::new(FileTranscriptStore::new(config.data_dir.join("transcripts")).await?)
            };

            let registry = SessionRegistry::new();
            let settings = OrchestratorSettings {
                generation_timeout: Duration::from_secs(config.generation_timeout_secs),
                context_window: config.context_window,
                demo_session_ttl: Some(Duration::from_secs(config.demo_session_ttl_secs)),
            };
            let orchestrator = Arc::new(ChatOrchestrator::new(
                store, provider, registry, settings,
            ));

            let app = GatewayServer::build(orchestrator);

            let addr = format!("{host}:{port}");
            info!("Starting Confab relay on {}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
