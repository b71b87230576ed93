//! JSON I/O handling for CLI
//!
//! - Input: single JSON object via stdin
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::compiler::CompiledQuery;
use crate::request::{PivotValues, RowsRequest};
use crate::response::Row;

use super::errors::{CliError, CliResult};

/// Input of `compile` and `explain`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileInput {
    pub table: String,
    pub request: RowsRequest,
    #[serde(default)]
    pub pivot_values: PivotValues,
}

/// Input of `shape`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInput {
    pub request: RowsRequest,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub pivot_values: PivotValues,
    /// Statement that produced `rows`
    #[serde(default)]
    pub query: Option<CompiledQuery>,
    /// Execution failure, if any
    #[serde(default)]
    pub error: Option<String>,
}

/// Read a JSON request document from stdin
pub fn read_request<T: DeserializeOwned>() -> CliResult<T> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Parse a JSON request document
pub fn parse_request<T: DeserializeOwned>(input: &str) -> CliResult<T> {
    if input.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
