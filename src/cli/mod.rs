//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Load config and seed data, then serve the HTTP API
//! - compile: Print the statement a browse request compiles to

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, CompileArgs};
pub use commands::{compile, compile_statement, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
