//! CLI command implementations
//!
//! Each command loads configuration, reads one JSON document from stdin
//! and writes one JSON response to stdout. Compile failures are written as
//! error responses; only configuration and I/O failures end the process.

use std::path::Path;

use serde::Serialize;

use crate::compiler::{CompileExplain, CompileResult, CompiledQuery, QueryCompiler};
use crate::config::CompilerConfig;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::response::{ResponseShaper, RowsPage};

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response, CompileInput, ShapeInput};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
///
/// Failures are logged as COMMAND_FAILED before they are returned.
pub fn run_command(cmd: Command) -> CliResult<()> {
    dispatch(cmd).map_err(|err| {
        log_event_with_fields(
            Event::CommandFailed,
            &[("code", err.code_str()), ("message", err.message())],
        );
        err
    })
}

fn dispatch(cmd: Command) -> CliResult<()> {
    let config = load_config(cmd.config_path().map(|p| p.as_path()))?;
    Logger::set_min_severity(config.log_level);

    match cmd {
        Command::Compile { .. } => respond(compile(&config, read_request()?)),
        Command::Explain { .. } => respond(explain(&config, read_request()?)),
        Command::Shape { .. } => respond(shape(&config, read_request()?)),
    }
}

/// Load configuration, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::load(path)?),
        None => Ok(CompilerConfig::default()),
    }
}

/// Compile a request into `{sql, binds}`
pub fn compile(config: &CompilerConfig, input: CompileInput) -> CompileResult<CompiledQuery> {
    QueryCompiler::new(config.clone()).compile(&input.request, &input.table, &input.pivot_values)
}

/// Compile a request and describe the compile
pub fn explain(config: &CompilerConfig, input: CompileInput) -> CompileResult<CompileExplain> {
    QueryCompiler::new(config.clone()).explain(&input.request, &input.table, &input.pivot_values)
}

/// Shape executed rows, or an execution error, into a rows page
pub fn shape(config: &CompilerConfig, input: ShapeInput) -> CompileResult<RowsPage> {
    let shaper = ResponseShaper::new(config);
    match &input.error {
        Some(error) => Ok(shaper.shape_error(error, input.query.as_ref())),
        None => shaper.shape(
            &input.request,
            input.rows,
            &input.pivot_values,
            input.query.as_ref(),
        ),
    }
}

/// Writes the result as an ok or error response
fn respond<T: Serialize>(result: CompileResult<T>) -> CliResult<()> {
    match result {
        Ok(data) => write_response(serde_json::to_value(&data)?),
        Err(err) => write_error(err.code(), &err.to_string()),
    }
}
