use clap::{Parser, Subcommand};

use geoscout_backend::{BackendClient, RetryPolicy};

mod dashboard;
mod discover;
mod geofences;
mod places;

#[derive(Debug, Parser)]
#[command(name = "geoscout")]
#[command(about = "Geofence and field-visit operations console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage geofences
    Geofence {
        #[command(subcommand)]
        command: geofences::GeofenceCommand,
    },
    /// Discover places inside a geofence
    Discover(discover::DiscoverArgs),
    /// Manage saved places
    Place {
        #[command(subcommand)]
        command: places::PlaceCommand,
    },
    /// Summary counts across geofences and places
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = geoscout_core::load_app_config_from_env()?;

    let backend = BackendClient::new(
        &config.backend_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?
    .with_retry_policy(RetryPolicy {
        max_retries: config.backend_max_retries,
        base_delay_ms: config.backend_retry_base_delay_ms,
        inter_save_delay_ms: config.backend_inter_save_delay_ms,
    });

    match cli.command {
        Commands::Geofence { command } => geofences::run(&backend, command).await,
        Commands::Discover(args) => discover::run(&config, &backend, args).await,
        Commands::Place { command } => places::run(&backend, command).await,
        Commands::Dashboard => dashboard::run(&backend).await,
    }
}
