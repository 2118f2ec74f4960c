use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dendrite::config::Config;
use dendrite::driver::{self, RunDescriptor};

/// Phase field simulation of dendritic growth in a pure metal
#[derive(Parser, Debug)]
#[command(name = "dendrite", version)]
struct Args {
    /// Resume from the last snapshot in the output directory
    #[arg(long)]
    restart: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// JSON configuration file
    config: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = Config::load(&args.config).and_then(|config| {
        driver::run(
            &config,
            RunDescriptor {
                restart: args.restart,
                verbose: !args.quiet,
            },
        )
    });

    match result {
        Ok(outcome) => {
            tracing::info!(?outcome, "run finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(config = %args.config.display(), "{}", err);
            ExitCode::FAILURE
        }
    }
}
