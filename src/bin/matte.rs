use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use matte::cli::{run_cli, Cli};
use matte::runtime_config::RuntimeConfig;

fn init_logging(verbose: bool) {
    let directive = if verbose {
        "debug".to_string()
    } else {
        RuntimeConfig::from_env()
            .log_filter
            .unwrap_or_else(|| "info".to_string())
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose());
    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
