//! acgctl - manage directory IP access control groups from `settings.yaml`.

use std::path::PathBuf;
use std::process::ExitCode;

use acgctl::actions;
use acgctl::error::Error;
use acgctl::provider::aws::AwsProvider;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Manage IP access control groups for WorkSpaces directories from a
/// declarative settings file.
#[derive(Parser, Debug)]
#[command(name = "acgctl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "settings.yaml")]
    settings: PathBuf,

    /// AWS region override (defaults to the environment)
    #[arg(long)]
    region: Option<String>,

    /// Report what would happen without calling any mutating operation
    #[arg(long)]
    dryrun: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current directories and IP ACGs, and validate the settings
    Status,

    /// Create the declared IP ACGs and associate them with directories
    Create,

    /// Update the rules of existing IP ACGs to the declared rules
    Update,

    /// Disassociate and delete IP ACGs by id
    Delete {
        /// IP ACG ids to delete
        ids: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Could not build the tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Full provider detail is only logged here; the composed message
            // below is what the user acts on.
            if let Error::Provider(provider_error) = &e {
                error!(detail = ?provider_error, "provider call failed");
            }
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let provider = AwsProvider::connect(cli.region.clone()).await;

    let (mut settings, inventory) = actions::common_route(&provider, &cli.settings).await?;

    let verb = if cli.dryrun { "would" } else { "will" };
    match cli.command {
        Commands::Status => actions::status(),
        Commands::Create => {
            info!("These IP ACGs {verb} be attempted to create:");
            actions::create(&provider, &settings, &inventory, cli.dryrun).await?;
        }
        Commands::Update => {
            info!("These IP ACGs {verb} be attempted to update:");
            actions::update(&provider, &mut settings, &inventory, cli.dryrun).await?;
        }
        Commands::Delete { ids } => {
            info!("These IP ACGs {verb} be attempted to delete: {ids:?}");
            actions::delete(&provider, &inventory, &ids, cli.dryrun).await?;
        }
    }

    Ok(())
}
