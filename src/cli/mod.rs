//! CLI module for gridsql
//!
//! Provides command-line interface for:
//! - compile: Request JSON in, `{sql, binds}` out
//! - explain: Request JSON in, compile summary out
//! - shape: Executed rows in, rows page out

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, explain, load_config, run, run_command, shape};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response, CompileInput, ShapeInput};
