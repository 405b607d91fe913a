mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 nanogeom CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    configure_threads(cli.threads)?;

    let quiet = cli.quiet;
    let command_result = match cli.command {
        Commands::Create(args) => {
            info!("Dispatching to 'create' command.");
            commands::create::run(args, quiet)
        }
        Commands::Separate(args) => {
            info!("Dispatching to 'separate' command.");
            commands::separate::run(args, quiet)
        }
        Commands::Translate(args) => commands::tools::translate(args),
        Commands::Rotate(args) => commands::tools::rotate(args),
        Commands::MinDist(args) => commands::tools::min_dist(args),
        Commands::Centroid(args) => commands::tools::centroid(args),
        Commands::Center(args) => commands::tools::center(args),
        Commands::Mirror(args) => commands::tools::mirror(args),
        Commands::Merge(args) => commands::tools::merge(args),
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
        }
    }

    command_result
}

#[cfg(feature = "parallel")]
fn configure_threads(threads: Option<usize>) -> Result<()> {
    if let Some(num_threads) = threads {
        info!("Setting Rayon global thread pool to {} threads.", num_threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(threads: Option<usize>) -> Result<()> {
    if threads.is_some() {
        tracing::warn!("--threads has no effect: built without the 'parallel' feature.");
    }
    Ok(())
}
