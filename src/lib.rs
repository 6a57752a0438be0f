//! # matte
//!
//! **matte** turns annotated Go handler functions into a runnable,
//! supervised server program. It reads a Go module, finds the functions whose
//! doc comments declare routes, checks each against the handler shapes of the
//! enabled frameworks and synthesizes `matte/app.go`: one `ServeMux` server per
//! framework, generated request-parameter verification, signal handling and
//! graceful shutdown.
//!
//! ## Architecture
//!
//! - **[`syntax`]** - Go source parsing (tree-sitter) into an owned syntax model
//! - **[`project`]** - `go.mod` resolution, breadth-first package loading, `matte.toml`
//! - **[`annotations`]** - `@path(...)` decorators and swag-style `@Router`/`@Param` lines
//! - **[`handler`]** - routes, handler references and parameter descriptors
//! - **[`frameworks`]** - pluggable handler shapes and their bootstrap rendering
//! - **[`registry`]** - binds every annotated function to the first matching framework
//! - **[`generator`]** - askama templates for the program, verifier and build driver
//! - **[`pipeline`]** - the `build` and `configure` operations
//! - **[`cli`]** - the `matte` command line
//!
//! ### Build Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as matte build
//!     participant Project as project
//!     participant Frameworks as frameworks
//!     participant Registry as registry
//!     participant Generator as generator
//!     participant Go as go build
//!
//!     CLI->>Project: resolve_module_path(go.mod)
//!     CLI->>Project: load_project(root)
//!     Project-->>CLI: packages, breadth-first
//!     CLI->>Frameworks: configure from GeneralAPIInfo()
//!     CLI->>Registry: process_project
//!     Registry->>Frameworks: framework_for(signature), bind(route, handler)
//!     CLI->>Generator: synthesize + write_program
//!     Generator-->>CLI: matte/app.go
//!     CLI->>Go: go build -o app .
//! ```
//!
//! ## Quick Start
//!
//! ```go
//! // main.go, the module root
//! func GeneralAPIInfo() (frameworks.HttpConfig, frameworks.ParamsConfig) {
//!     return frameworks.HttpConfig{Addr: ":8080"}, frameworks.ParamsConfig{Addr: ":8081"}
//! }
//!
//! // router/hello.go
//! // @path("GET", "/hello")
//! func Hello(w http.ResponseWriter, r *http.Request) { ... }
//!
//! // users/get.go
//! // @Router /users/{id} [get]
//! func GetUser(id int, verbose *bool) { ... }
//! ```
//!
//! ```bash
//! matte build --dir .
//! ./matte/app
//! ```

pub mod annotations;
pub mod cli;
pub mod error;
pub mod frameworks;
pub mod generator;
pub mod handler;
pub mod pipeline;
pub mod project;
pub mod registry;
pub mod runtime_config;
pub mod syntax;

pub use error::{MatteError, Result};
pub use pipeline::{configure, run_build, BuildOptions, BuildReport};
