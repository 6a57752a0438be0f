//! # Generator Module
//!
//! Turns the bindings accumulated by the frameworks into one runnable Go
//! program and hands it to the Go toolchain.
//!
//! ## Architecture
//!
//! Code is produced from Askama templates under `templates/`:
//!
//! ```text
//! Frameworks → Bootstrap per framework → program.go.txt → matte/app.go → go build
//! ```
//!
//! 1. **Verifier** - wraps typed handlers in parameter checks (`params_handler.go.txt`)
//! 2. **Bootstrap** - one function per active framework (`bootstrap.go.txt`)
//! 3. **Program** - imports, bootstraps and the supervising `main` (`program.go.txt`)
//! 4. **Build** - writes the scratch directory and runs `go build`
//!
//! ## Generated Program
//!
//! ```text
//! <project>/
//! └── matte/
//!     ├── app.go    # synthesized program
//!     └── app       # compiled binary
//! ```
//!
//! `main` starts every bootstrap, fans their serve errors into one channel
//! and waits for either a serve error (fatal) or `SIGINT`/`SIGTERM`, which
//! shuts every server down in order and joins the shutdown errors.

mod build;
mod program;
pub mod templates;
pub mod verifier;

pub use build::{build_program, clean_scratch_dir, write_program, PROGRAM_FILE};
pub use program::{is_project_import, render_program, synthesize, SUPERVISOR_IMPORTS};
