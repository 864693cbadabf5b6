//! CLI argument definitions using clap
//!
//! Commands:
//! - keyspace-browser serve --config <path> [--port <n>]
//! - keyspace-browser compile --keyspace <ks> --table <t> [filter] [--count]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Query compilation and cursor pagination service for a wide-column store console
#[derive(Parser, Debug)]
#[command(name = "keyspace-browser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the browse API over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./keyspace-browser.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the statement a browse request compiles to, as JSON
    Compile(CompileArgs),
}

/// Browse request to compile
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CompileArgs {
    #[arg(long)]
    pub keyspace: String,

    #[arg(long)]
    pub table: String,

    /// Filter column
    #[arg(long)]
    pub column: Option<String>,

    /// Filter operator: eq, ne, gt, lt, ge, le, contains (or = != > < >= <=)
    #[arg(long)]
    pub operator: Option<String>,

    /// Filter value
    #[arg(long)]
    pub value: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    #[arg(long, default_value_t = crate::query::DEFAULT_MAX_RESULT_LIMIT)]
    pub max_result_limit: u32,

    /// Request the full-scan flag explicitly
    #[arg(long)]
    pub allow_filtering: bool,

    /// Compile the count statement instead of the page statement
    #[arg(long)]
    pub count: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
