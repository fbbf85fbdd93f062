mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use classifier_studio::config::Config;
use cli::{Args, Command};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
/// `log` records from the library are bridged into it.
fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let result = match args.command {
        Command::Inspect { archive } => cli::inspect(&archive),
        Command::Config { action } => cli::handle_config_action(action, args.config.as_deref()),
        Command::Record(record) => match Config::load(args.config.as_deref()) {
            Ok(config) => cli::record(record, &config).await,
            Err(e) => Err(e.into()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
