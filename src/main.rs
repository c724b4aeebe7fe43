use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};

use gator::cli::{self, Cli, State};
use gator::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load_or_create(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    config.apply_env_overrides();
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration in {}: {e}", cli.config.display());
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = gator::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        gator::logging::init_console_only(&config.logging.level);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to open database: {}", e);
            eprintln!("Failed to open database {}: {e}", config.database.path);
            return ExitCode::FAILURE;
        }
    };

    let name = cli.command.name();
    debug!("Running {} command", name);

    let mut state = State::new(config, cli.config, db);
    let mut stdout = std::io::stdout().lock();
    match cli::dispatch(&mut state, cli.command, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error running {name} command: {e}");
            ExitCode::FAILURE
        }
    }
}
