//! Response shaping
//!
//! Computes the "more rows?" sentinel and, in pivot mode, the secondary
//! column names the grid needs to lay out pivot results.

use std::fmt;

use crate::compiler::{CompileResult, CompiledQuery, PivotExpander};
use crate::config::CompilerConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::request::{PivotValues, RowsRequest};

use super::page::{last_row, Row, RowsPage, UNKNOWN_LAST_ROW};

/// Builds `RowsPage`s, attaching provenance and errors per configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseShaper {
    include_sql: bool,
    include_error: bool,
}

impl ResponseShaper {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            include_sql: config.include_sql_in_response,
            include_error: config.include_error_in_response,
        }
    }

    /// Shapes the rows returned for `request`.
    ///
    /// Secondary columns come from the same pivot product the compiler
    /// expands, so they line up with the SELECT aliases.
    pub fn shape(
        &self,
        request: &RowsRequest,
        rows: Vec<Row>,
        pivot_values: &PivotValues,
        query: Option<&CompiledQuery>,
    ) -> CompileResult<RowsPage> {
        let secondary_columns = if request.pivot_mode {
            let expander = PivotExpander::new(&request.pivot_cols, pivot_values)?;
            Some(expander.secondary_columns(&request.value_cols))
        } else {
            None
        };

        let page = RowsPage {
            last_row: last_row(request.start_row, request.end_row, rows.len()),
            rows,
            secondary_columns,
            from_sql: self.provenance(query),
            ux_reportable_error: None,
        };

        let returned = page.rows.len().to_string();
        let last = page.last_row.to_string();
        log_event_with_fields(
            Event::ResponseShaped,
            &[("rows", returned.as_str()), ("last_row", last.as_str())],
        );

        Ok(page)
    }

    /// Failure page: no rows and an open-ended `lastRow`
    pub fn shape_error(
        &self,
        error: &dyn fmt::Display,
        query: Option<&CompiledQuery>,
    ) -> RowsPage {
        RowsPage {
            rows: Vec::new(),
            last_row: UNKNOWN_LAST_ROW,
            secondary_columns: None,
            from_sql: self.provenance(query),
            ux_reportable_error: self.include_error.then(|| error.to_string()),
        }
    }

    fn provenance(&self, query: Option<&CompiledQuery>) -> Option<CompiledQuery> {
        if self.include_sql {
            query.cloned()
        } else {
            None
        }
    }
}
