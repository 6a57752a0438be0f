//! # CLI Module
//!
//! Command-line front end of the `matte` binary.
//!
//! ## Commands
//!
//! ### `build`
//!
//! Discover the annotated handlers of a Go project, synthesize
//! `matte/app.go` and compile it:
//!
//! ```bash
//! matte build --dir ./my-service
//! ```
//!
//! Options:
//! - `--dir, -d <DIR>` - Project root holding `go.mod` (default: current directory)
//! - `--no-build, -n` - Write `matte/app.go` but skip the Go compiler
//! - `--verbose, -v` - Log at debug level
//!
//! ### `configure`
//!
//! Check that a directory is a Go module matte can work on:
//!
//! ```bash
//! matte configure --dir ./my-service
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use clap::Parser;
//! use matte::cli::{run_cli, Cli};
//!
//! run_cli(Cli::parse())?;
//! ```
//!
//! ## Environment
//!
//! - `MATTE_GO_BIN` - Go toolchain binary (default `go`)
//! - `MATTE_LOG` - log filter (default `info`)

mod commands;

pub use commands::{run_cli, Cli, Commands};

#[cfg(test)]
mod tests;
