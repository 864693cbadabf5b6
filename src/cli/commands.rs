//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use crate::browse::BrowseService;
use crate::config::ConsoleConfig;
use crate::executor::{MemoryStore, StatementExecutor};
use crate::http_server::HttpServer;
use crate::observability::init_logging;
use crate::query::{CompiledQuery, QueryCompiler, RawFilter, TableRef};

use super::args::{Cli, Command, CompileArgs};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Compile(args) => compile(&args),
    }
}

/// Boot the HTTP API over the in-memory store.
///
/// A missing seed file is fatal; no seed path means an empty store.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = ConsoleConfig::load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    init_logging(&config.logging)?;

    let store = match &config.seed_path {
        Some(path) => MemoryStore::load(path)?,
        None => {
            tracing::warn!("no seed_path configured, serving an empty store");
            MemoryStore::new()
        }
    };
    let executor: Arc<dyn StatementExecutor> = Arc::new(store);
    let service = Arc::new(BrowseService::new(executor, config.browse.clone()));
    let server = HttpServer::new(config.server.clone(), service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print the compiled statement for a browse request
pub fn compile(args: &CompileArgs) -> CliResult<()> {
    let compiled = compile_statement(args)?;
    write_response(&compiled)
}

/// Compile the page (or count) statement described by `args`
pub fn compile_statement(args: &CompileArgs) -> CliResult<CompiledQuery> {
    let compiler = QueryCompiler::new(args.max_result_limit);
    let target = TableRef::new(&args.keyspace, &args.table);
    let filter = RawFilter {
        column: args.column.clone(),
        operator: args.operator.clone(),
        value: args.value.clone(),
    }
    .into_spec()?;

    let compiled = if args.count {
        compiler.compile_count(&target, filter.as_ref(), args.allow_filtering)?
    } else {
        compiler.compile_page(&target, filter.as_ref(), args.page_size, args.allow_filtering)?
    };
    Ok(compiled)
}
