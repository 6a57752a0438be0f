use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::pipeline::{configure, run_build, BuildOptions};

/// Command-line interface for the matte handler scaffolder.
#[derive(Parser)]
#[command(
    name = "matte",
    version,
    about = "Wire annotated Go handlers into a supervised server program"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether debug logging was requested.
    pub fn verbose(&self) -> bool {
        matches!(self.command, Commands::Build { verbose: true, .. })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize matte/app.go from the project's handlers and compile it
    Build {
        /// Project root holding go.mod
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Only write the program, do not run the Go compiler
        #[arg(short, long)]
        no_build: bool,
        /// Log at debug level
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check that a directory is a Go module
    Configure {
        /// Project root holding go.mod
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

/// Execute a parsed command line.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build { dir, no_build, .. } => {
            let options = BuildOptions {
                no_build,
                ..BuildOptions::new(dir.clone())
            };
            let report = run_build(&options)
                .with_context(|| format!("matte build failed for {}", dir.display()))?;
            match &report.binary {
                Some(binary) => println!("built {}", binary.display()),
                None => println!("wrote {}", report.program_path.display()),
            }
            for handler in &report.handlers {
                for route in &handler.routes {
                    info!(framework = %handler.framework, route = %route, handler = %handler.handler, "route");
                }
            }
            Ok(())
        }
        Commands::Configure { dir } => {
            let module_path = configure(&dir)
                .with_context(|| format!("{} is not a usable Go module", dir.display()))?;
            println!("module {module_path} is ready, run `matte build`");
            Ok(())
        }
    }
}
