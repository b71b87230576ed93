//! Query compiler
//!
//! `QueryCompiler` owns only configuration. Every call builds its own
//! immutable `CompileContext`, so one compiler can be shared across threads.

use serde::{Deserialize, Serialize};

use crate::config::CompilerConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::request::{PivotValues, RowsRequest};

use super::ast::{BindValue, TableRef};
use super::clauses;
use super::errors::{CompileError, CompileResult};
use super::explain::CompileExplain;
use super::filters::UnknownOperatorPolicy;
use super::grouping::DrillPath;
use super::pivot::PivotExpander;
use super::render::{render, Dialect};

/// Shape of the statement a request compiles to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    Flat,
    Grouped,
    Pivot,
}

impl CompileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompileMode::Flat => "flat",
            CompileMode::Grouped => "grouped",
            CompileMode::Pivot => "pivot",
        }
    }
}

/// Everything one compile call knows, resolved up front
#[derive(Debug)]
pub struct CompileContext<'a> {
    pub request: &'a RowsRequest,
    pub table: TableRef,
    pub drill: DrillPath,
    /// Present iff the request pivots
    pub pivot: Option<PivotExpander<'a>>,
    pub policy: UnknownOperatorPolicy,
    /// Rows to fetch, bounded by `max_page_size`
    pub page_size: i64,
}

impl<'a> CompileContext<'a> {
    /// Validates the request and resolves drill and pivot state
    pub fn new(
        request: &'a RowsRequest,
        table: &str,
        pivot_values: &'a PivotValues,
        config: &CompilerConfig,
    ) -> CompileResult<Self> {
        // 1. Window
        if request.start_row < 0 || request.end_row < request.start_row {
            return Err(CompileError::InvalidWindow {
                start_row: request.start_row,
                end_row: request.end_row,
            });
        }

        // 2. Page size; 0 <= start_row <= end_row, so the span cannot overflow
        let size = (request.end_row - request.start_row) as u64 + 1;
        if size > config.max_page_size {
            return Err(CompileError::PageTooLarge {
                size,
                max: config.max_page_size,
            });
        }

        // 3. Identifiers
        let table = TableRef::parse(table)?;
        if request.value_cols.iter().any(|col| col.field.is_empty()) {
            return Err(CompileError::EmptyIdentifier("value column"));
        }
        if request.sort.iter().any(|spec| spec.column_id.is_empty()) {
            return Err(CompileError::EmptyIdentifier("sort column"));
        }

        // 4. Drill path and pivot product
        let drill = DrillPath::resolve(request)?;
        let pivot = if request.pivots() {
            Some(PivotExpander::new(&request.pivot_cols, pivot_values)?)
        } else {
            None
        };

        Ok(Self {
            request,
            table,
            drill,
            pivot,
            policy: config.unknown_operator,
            page_size: size as i64,
        })
    }

    pub fn mode(&self) -> CompileMode {
        if self.pivot.is_some() {
            CompileMode::Pivot
        } else if self.drill.is_grouping() {
            CompileMode::Grouped
        } else {
            CompileMode::Flat
        }
    }
}

/// A parameterized statement and its binds, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl CompiledQuery {
    /// Placeholders in `sql` as written by `dialect`
    pub fn placeholder_count(&self, dialect: Dialect) -> usize {
        dialect.count_placeholders(&self.sql)
    }

    /// True if every placeholder has exactly one bind
    pub fn is_aligned(&self, dialect: Dialect) -> bool {
        self.placeholder_count(dialect) == self.binds.len()
    }
}

/// Compiles row model requests into parameterized SQL
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    config: CompilerConfig,
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `request` against `table`.
    ///
    /// `pivot_values` is only read when the request pivots. Same inputs
    /// always produce byte-identical output.
    pub fn compile(
        &self,
        request: &RowsRequest,
        table: &str,
        pivot_values: &PivotValues,
    ) -> CompileResult<CompiledQuery> {
        self.logged(request, table, || {
            let ctx = CompileContext::new(request, table, pivot_values, &self.config)?;
            let query = self.compile_context(&ctx)?;
            Ok((query, ctx.mode()))
        })
        .map(|(query, _)| query)
    }

    /// Compiles `request` and summarizes how it was compiled
    pub fn explain(
        &self,
        request: &RowsRequest,
        table: &str,
        pivot_values: &PivotValues,
    ) -> CompileResult<CompileExplain> {
        self.logged(request, table, || {
            let ctx = CompileContext::new(request, table, pivot_values, &self.config)?;
            let query = self.compile_context(&ctx)?;
            let explain = CompileExplain::new(&ctx, &query, self.config.dialect);
            Ok((explain, ctx.mode()))
        })
        .map(|(explain, _)| explain)
    }

    fn compile_context(&self, ctx: &CompileContext<'_>) -> CompileResult<CompiledQuery> {
        let stmt = clauses::statement(ctx)?;
        let (sql, binds) = render(&stmt, self.config.dialect);
        Ok(CompiledQuery { sql, binds })
    }

    /// Runs `f` between COMPILE_START and COMPILE_COMPLETE / COMPILE_REJECTED
    fn logged<T>(
        &self,
        request: &RowsRequest,
        table: &str,
        f: impl FnOnce() -> CompileResult<(T, CompileMode)>,
    ) -> CompileResult<(T, CompileMode)> {
        let start_row = request.start_row.to_string();
        let end_row = request.end_row.to_string();
        log_event_with_fields(
            Event::CompileStart,
            &[
                ("table", table),
                ("start_row", start_row.as_str()),
                ("end_row", end_row.as_str()),
            ],
        );

        let result = f();
        match &result {
            Ok((_, mode)) => {
                log_event_with_fields(
                    Event::CompileComplete,
                    &[("table", table), ("mode", mode.as_str())],
                );
            }
            Err(err) => {
                let message = err.to_string();
                log_event_with_fields(
                    Event::CompileRejected,
                    &[
                        ("table", table),
                        ("code", err.code()),
                        ("message", message.as_str()),
                    ],
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ColumnSpec;

    fn compiler() -> QueryCompiler {
        QueryCompiler::new(CompilerConfig::default())
    }

    #[test]
    fn test_compiler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryCompiler>();
    }

    #[test]
    fn test_invalid_windows() {
        let pivot_values = PivotValues::new();
        for (start, end) in [(-1, 10), (10, 9)] {
            let err = compiler()
                .compile(&RowsRequest::new(start, end), "t", &pivot_values)
                .unwrap_err();
            assert_eq!(
                err,
                CompileError::InvalidWindow {
                    start_row: start,
                    end_row: end
                }
            );
        }
    }

    #[test]
    fn test_single_row_window() {
        let query = compiler()
            .compile(&RowsRequest::new(5, 5), "t", &PivotValues::new())
            .unwrap();
        assert_eq!(query.binds, vec![BindValue::from(5), BindValue::from(1)]);
    }

    #[test]
    fn test_page_too_large() {
        let compiler = QueryCompiler::new(CompilerConfig::default().with_max_page_size(100));
        let err = compiler
            .compile(&RowsRequest::new(0, 100), "t", &PivotValues::new())
            .unwrap_err();
        assert_eq!(err, CompileError::PageTooLarge { size: 101, max: 100 });

        assert!(compiler
            .compile(&RowsRequest::new(0, 99), "t", &PivotValues::new())
            .is_ok());
    }

    #[test]
    fn test_widest_window_is_too_large() {
        let err = compiler()
            .compile(&RowsRequest::new(0, i64::MAX), "t", &PivotValues::new())
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::PageTooLarge {
                size: i64::MAX as u64 + 1,
                max: 10_000
            }
        );

        // Even the largest configurable maximum cannot hold it
        let compiler =
            QueryCompiler::new(CompilerConfig::default().with_max_page_size(i64::MAX as u64));
        let err = compiler
            .compile(&RowsRequest::new(0, i64::MAX), "t", &PivotValues::new())
            .unwrap_err();
        assert_eq!(err.code(), "GRIDSQL_PAGE_TOO_LARGE");

        let query = compiler
            .compile(&RowsRequest::new(1, i64::MAX), "t", &PivotValues::new())
            .unwrap();
        assert_eq!(query.binds[1], BindValue::from(i64::MAX));
    }

    #[test]
    fn test_empty_identifiers() {
        let pivot_values = PivotValues::new();
        let err = compiler()
            .compile(&RowsRequest::new(0, 9), "", &pivot_values)
            .unwrap_err();
        assert_eq!(err, CompileError::EmptyIdentifier("table name"));

        let request = RowsRequest::new(0, 9).with_value(ColumnSpec::field(""));
        let err = compiler().compile(&request, "t", &pivot_values).unwrap_err();
        assert_eq!(err, CompileError::EmptyIdentifier("value column"));
    }

    #[test]
    fn test_mode() {
        let pivot_values = PivotValues::new();
        let config = CompilerConfig::default();

        let flat = RowsRequest::new(0, 9);
        let ctx = CompileContext::new(&flat, "t", &pivot_values, &config).unwrap();
        assert_eq!(ctx.mode(), CompileMode::Flat);

        let grouped = RowsRequest::new(0, 9).with_row_group(ColumnSpec::field("region"));
        let ctx = CompileContext::new(&grouped, "t", &pivot_values, &config).unwrap();
        assert_eq!(ctx.mode(), CompileMode::Grouped);

        let pivot = RowsRequest::new(0, 9).with_pivot(ColumnSpec::field("quarter"));
        let ctx = CompileContext::new(&pivot, "t", &pivot_values, &config).unwrap();
        assert_eq!(ctx.mode(), CompileMode::Pivot);
    }

    #[test]
    fn test_compiled_query_alignment() {
        let query = CompiledQuery {
            sql: "SELECT * FROM \"t\" OFFSET ? ROWS FETCH NEXT ? ROWS ONLY".into(),
            binds: vec![0.into(), 10.into()],
        };
        assert_eq!(query.placeholder_count(Dialect::Ansi), 2);
        assert!(query.is_aligned(Dialect::Ansi));
    }

    #[test]
    fn test_compiled_query_json() {
        let query = compiler()
            .compile(&RowsRequest::new(0, 9), "t", &PivotValues::new())
            .unwrap();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["binds"], serde_json::json!([0, 10]));
        assert!(json["sql"].as_str().unwrap().starts_with("SELECT *"));
    }
}
