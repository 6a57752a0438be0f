//! Unit tests for CLI parsing

#![allow(clippy::unwrap_used)]

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_build_defaults() {
    let cli = Cli::try_parse_from(["matte", "build"]).unwrap();
    match cli.command {
        Commands::Build {
            dir,
            no_build,
            verbose,
        } => {
            assert_eq!(dir.to_string_lossy(), ".");
            assert!(!no_build);
            assert!(!verbose);
        }
        _ => panic!("Expected Build command"),
    }
}

#[test]
fn test_build_short_flags() {
    let cli = Cli::try_parse_from(["matte", "build", "-n", "-d", "svc", "-v"]).unwrap();
    assert!(cli.verbose());
    match cli.command {
        Commands::Build { dir, no_build, .. } => {
            assert_eq!(dir.to_string_lossy(), "svc");
            assert!(no_build);
        }
        _ => panic!("Expected Build command"),
    }
}

#[test]
fn test_configure_command() {
    let cli = Cli::try_parse_from(["matte", "configure", "--dir", "svc"]).unwrap();
    assert!(!cli.verbose());
    match cli.command {
        Commands::Configure { dir } => assert_eq!(dir.to_string_lossy(), "svc"),
        _ => panic!("Expected Configure command"),
    }
}

#[test]
fn test_unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["matte", "build", "--force"]).is_err());
    assert!(Cli::try_parse_from(["matte"]).is_err());
}

#[test]
fn test_help_is_an_early_exit() {
    let err = Cli::try_parse_from(["matte", "build", "-h"]).err().unwrap();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}
