//! Pulsedesk console client
//!
//! A terminal front-end for the dashboard notification feed. It is a thin
//! adapter: all classification lives in `pulsedesk-core`, this binary only
//! subscribes and prints.
//!
//! # Modes
//!
//! - `pulsedesk watch` (default): follow the push channel and print toasts
//!   and connection badges as they arrive.
//! - `pulsedesk summary`: fetch the on-demand summary once and print it.
//!
//! Set `RUST_LOG=debug` for verbose diagnostics.

mod render;

use clap::{Parser, Subcommand};
use pulsedesk_core::{
    ClientConfig, ConnectionStateStore, NotificationChannel, SseTransport, SummaryFetcher,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser)]
#[command(name = "pulsedesk", version, about = "Dashboard notification feed client")]
struct Cli {
    /// Base URL of the dashboard server
    #[arg(long, default_value = "http://localhost:8080", env = "PULSEDESK_URL")]
    url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the notification feed (default)
    Watch,
    /// Fetch the on-demand summary once and print it
    Summary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.url);

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(config).await,
        Commands::Summary => {
            let fetcher = SummaryFetcher::new(&config)?;
            println!("{}", fetcher.fetch_summary_now().await);
            Ok(())
        }
    }
}

async fn watch(config: ClientConfig) -> anyhow::Result<()> {
    let store = Arc::new(ConnectionStateStore::new(config.status_capacity));
    let transport = SseTransport::new(&config)?;
    let mut channel =
        NotificationChannel::new(transport, Arc::clone(&store), config.toast_capacity);

    let mut toasts = channel.subscribe_toasts();
    tokio::spawn(async move {
        loop {
            match toasts.recv().await {
                Ok(toast) => render::print_toast(&toast),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "toast renderer lagged behind the feed");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut changes = store.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(status) => render::print_badge(&status),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "badge renderer lagged behind the feed");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    channel.run().await?;
    Ok(())
}
