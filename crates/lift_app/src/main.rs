//! `ledgerlift`: package QuickBooks customers and invoices for Notion or
//! Airtable.
//!
//! Walks the same steps as the guided wizard (connect, choose data, choose a
//! platform, migrate) from command-line flags and saves the resulting zip.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use lift_core::logging;
use lift_core::{DataType, LiftConfig, TargetPlatform, WizardState};
use lift_migrate::{DownloadStore, MigrationRequest, MigrationRunner, inspect_package};

/// LedgerLift migration tool.
#[derive(Parser, Debug)]
#[command(name = "ledgerlift", about = "Export QuickBooks data for Notion or Airtable")]
struct Cli {
    /// Path to config file (default: ~/.ledgerlift/config.json).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a migration package and save it to disk.
    Export {
        /// Record types to export (customers, invoices). Repeat or comma-separate.
        #[arg(long = "data", short = 'd', value_delimiter = ',')]
        data: Vec<DataType>,
        /// Destination platform (notion or airtable).
        #[arg(long, short = 'p')]
        platform: Option<TargetPlatform>,
        /// Output directory (overrides `output_dir` from the config).
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// Fixed RNG seed for reproducible sample data.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List destination platforms.
    Platforms,

    /// Show the files and record counts of a saved package.
    Inspect {
        /// Path to a migration package zip.
        archive: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LiftConfig::load_from_path(path)?,
        None => LiftConfig::load()?,
    };

    let _log_guard = match logging::init_logging(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging unavailable: {e:#}");
            None
        }
    };

    match cli.command {
        Commands::Export {
            data,
            platform,
            out,
            seed,
        } => export(config, data, platform, out, seed).await,
        Commands::Platforms => {
            for platform in TargetPlatform::ALL {
                println!("{:<10} {}", platform.as_str(), platform.description());
            }
            Ok(())
        }
        Commands::Inspect { archive } => {
            let bytes = std::fs::read(&archive)
                .with_context(|| format!("Failed to read {}", archive.display()))?;
            let summary = inspect_package(&bytes)?;
            println!("{}", summary.to_markdown());
            Ok(())
        }
    }
}

async fn export(
    config: LiftConfig,
    data: Vec<DataType>,
    platform: Option<TargetPlatform>,
    out: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let out_dir = out.unwrap_or_else(|| config.resolved_output_dir());
    let store = Arc::new(DownloadStore::new());
    let mut runner = MigrationRunner::new(config, Arc::clone(&store));
    if let Some(seed) = seed {
        runner = runner.with_seed(seed);
    }

    let mut wizard = WizardState::new();
    wizard.next()?;

    wizard.authenticate();
    info!("connected to QuickBooks (simulated)");
    wizard.next()?;

    wizard.select_data(data);
    wizard.next()?;

    if let Some(platform) = platform {
        wizard.select_platform(platform);
    }
    wizard.next()?;

    let request = MigrationRequest::from_wizard(&wizard)?;
    wizard.begin_migration();
    let result = runner
        .run(request, |status| {
            println!("[{:>3}%] {}", status.progress, status.message);
        })
        .await;
    wizard.finish_migration(result.is_ok());

    let handle = result.map_err(|e| {
        if e.is_retryable() {
            anyhow::anyhow!("{} Run the export again to retry.", e.user_message())
        } else {
            anyhow::anyhow!(e.user_message())
        }
    })?;

    let path = store.save_to_dir(&handle, &out_dir)?;
    for (data, count) in runner.record_counts() {
        println!("{}: {count} records exported", data.label());
    }
    println!("Saved {}", path.display());

    let step = wizard.next()?;
    info!("wizard finished at {step}");
    Ok(())
}
